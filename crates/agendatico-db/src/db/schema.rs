// Diesel table definitions, kept in lockstep with the SQL migrations.

diesel::table! {
    users (id) {
        id -> Int8,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 255]
        email -> Varchar,
        #[max_length = 255]
        password_hash -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    auth_identities (id) {
        id -> Int8,
        user_id -> Int8,
        #[max_length = 32]
        provider -> Varchar,
        #[max_length = 255]
        provider_user_id -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    sessions (id) {
        id -> Int8,
        user_id -> Int8,
        #[max_length = 64]
        token_digest -> Varchar,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
    }
}

diesel::table! {
    towns (id) {
        id -> Int8,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 255]
        slug -> Varchar,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        sort_order -> Int4,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    categories (id) {
        id -> Int8,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 255]
        slug -> Varchar,
        #[max_length = 64]
        icon -> Nullable<Varchar>,
        #[max_length = 32]
        color -> Nullable<Varchar>,
        sort_order -> Int4,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    places (id) {
        id -> Int8,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 255]
        slug -> Varchar,
        town_id -> Int8,
        #[max_length = 500]
        address -> Nullable<Varchar>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        #[max_length = 64]
        place_type -> Nullable<Varchar>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    events (id) {
        id -> Int8,
        #[max_length = 255]
        title -> Varchar,
        #[max_length = 255]
        slug -> Varchar,
        description -> Text,
        user_id -> Int8,
        category_id -> Int8,
        town_id -> Int8,
        place_id -> Nullable<Int8>,
        starts_at -> Timestamptz,
        ends_at -> Nullable<Timestamptz>,
        #[max_length = 500]
        address -> Nullable<Varchar>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        #[max_length = 255]
        organizer_name -> Nullable<Varchar>,
        price_type -> Text,
        #[max_length = 100]
        price_amount -> Nullable<Varchar>,
        #[max_length = 255]
        image_path -> Nullable<Varchar>,
        #[max_length = 255]
        instagram_url -> Nullable<Varchar>,
        #[max_length = 255]
        whatsapp_url -> Nullable<Varchar>,
        #[max_length = 255]
        website_url -> Nullable<Varchar>,
        views_count -> Int8,
        favorites_count -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    favorites (id) {
        id -> Int8,
        user_id -> Int8,
        event_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(auth_identities -> users (user_id));
diesel::joinable!(sessions -> users (user_id));
diesel::joinable!(places -> towns (town_id));
diesel::joinable!(events -> users (user_id));
diesel::joinable!(events -> categories (category_id));
diesel::joinable!(events -> towns (town_id));
diesel::joinable!(events -> places (place_id));
diesel::joinable!(favorites -> users (user_id));
diesel::joinable!(favorites -> events (event_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_identities,
    sessions,
    towns,
    categories,
    places,
    events,
    favorites,
);
