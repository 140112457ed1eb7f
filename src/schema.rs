diesel::table! {
    interactions (id) {
        id -> Int4,
        user_id -> Int4,
        video_id -> Int4,
        interaction_type -> Varchar,
        content -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    meta_items (id) {
        id -> Int4,
        video_id -> Int4,
        item_type -> Nullable<Varchar>,
        item_key -> Nullable<Varchar>,
        item_value -> Nullable<Varchar>,
        thumbnail_url -> Nullable<Varchar>,
        label -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    users (id) {
        id -> Int4,
        username -> Varchar,
        avatar_url -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    videos (id) {
        id -> Int4,
        title -> Varchar,
        description -> Nullable<Text>,
        video_url -> Varchar,
        user_id -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(interactions -> users (user_id));
diesel::joinable!(interactions -> videos (video_id));
diesel::joinable!(meta_items -> videos (video_id));
diesel::joinable!(videos -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    interactions,
    meta_items,
    users,
    videos,
);
