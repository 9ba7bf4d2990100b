// Table declarations for the collector schema.
// Kept in sync with src/migrations/ by hand.

diesel::table! {
    kosis_request_map (id) {
        id -> Integer,
        org_id -> Text,
        tbl_id -> Text,
        url -> Nullable<Text>,
    }
}

diesel::table! {
    kostat_observations (id) {
        id -> Integer,
        tbl_id -> Text,
        time_period -> Nullable<Text>,
        freq -> Nullable<Text>,
        itm_id -> Nullable<Text>,
        c1 -> Nullable<Text>,
        c2 -> Nullable<Text>,
        c3 -> Nullable<Text>,
        c4 -> Nullable<Text>,
        c5 -> Nullable<Text>,
        c6 -> Nullable<Text>,
        c7 -> Nullable<Text>,
        c8 -> Nullable<Text>,
        obs_value -> Double,
        created_at -> Text,
        created_by -> Text,
        created_screen -> Text,
        created_system -> Text,
        modified_at -> Text,
        modified_by -> Text,
        modified_screen -> Text,
        modified_system -> Text,
    }
}

diesel::table! {
    collection_status (collect_date) {
        collect_date -> Text,
        complete_flag -> Text,
        created_at -> Text,
        created_by -> Text,
        modified_at -> Text,
        modified_by -> Text,
    }
}
