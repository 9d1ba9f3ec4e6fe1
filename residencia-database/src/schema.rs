// Mirrors migrations/0001_initial.sql.

diesel::table! {
    staff (id) {
        id -> Int4,
        #[max_length = 15]
        national_id -> Varchar,
        #[max_length = 50]
        name -> Varchar,
        #[max_length = 100]
        surname -> Varchar,
        birth_date -> Nullable<Date>,
        #[max_length = 200]
        address -> Nullable<Varchar>,
        #[max_length = 15]
        phone -> Nullable<Varchar>,
        #[max_length = 100]
        email -> Nullable<Varchar>,
        #[max_length = 50]
        category -> Varchar,
        hired_on -> Date,
        active -> Bool,
    }
}

diesel::table! {
    users (id) {
        id -> Int4,
        #[max_length = 50]
        username -> Varchar,
        password_hash -> Text,
        #[max_length = 20]
        role -> Varchar,
        staff_id -> Nullable<Int4>,
        last_login -> Nullable<Timestamptz>,
        active -> Bool,
    }
}

diesel::table! {
    rooms (id) {
        id -> Int4,
        number -> Int4,
        #[max_length = 20]
        room_type -> Varchar,
        floor -> Int4,
        #[max_length = 20]
        status -> Varchar,
        #[max_length = 200]
        notes -> Nullable<Varchar>,
    }
}

diesel::table! {
    residents (id) {
        id -> Int4,
        #[max_length = 15]
        national_id -> Varchar,
        #[max_length = 50]
        name -> Varchar,
        #[max_length = 100]
        surname -> Varchar,
        birth_date -> Date,
        #[max_length = 1]
        gender -> Varchar,
        #[max_length = 100]
        email -> Varchar,
        admission_date -> Date,
        room_id -> Nullable<Int4>,
        #[max_length = 5]
        blood_type -> Nullable<Varchar>,
        #[max_length = 100]
        emergency_contact_name -> Nullable<Varchar>,
        #[max_length = 15]
        emergency_contact_phone -> Nullable<Varchar>,
        medical_notes -> Nullable<Text>,
        active -> Bool,
    }
}

diesel::table! {
    room_changes (id) {
        id -> Int4,
        resident_id -> Int4,
        previous_room_id -> Nullable<Int4>,
        new_room_id -> Int4,
        changed_at -> Timestamptz,
        reason -> Text,
        staff_id -> Nullable<Int4>,
    }
}

diesel::table! {
    medications (id) {
        id -> Int4,
        #[max_length = 100]
        name -> Varchar,
        #[max_length = 200]
        description -> Nullable<Varchar>,
        #[max_length = 50]
        kind -> Nullable<Varchar>,
        contraindications -> Nullable<Text>,
        stock -> Int4,
        minimum_stock -> Int4,
    }
}

diesel::table! {
    treatments (id) {
        id -> Int4,
        resident_id -> Int4,
        medication_id -> Int4,
        #[max_length = 50]
        dose -> Varchar,
        #[max_length = 50]
        frequency -> Varchar,
        #[max_length = 50]
        route -> Varchar,
        start_date -> Date,
        end_date -> Nullable<Date>,
        instructions -> Nullable<Text>,
        staff_id -> Int4,
        active -> Bool,
    }
}

diesel::table! {
    activities (id) {
        id -> Int4,
        #[max_length = 100]
        name -> Varchar,
        description -> Nullable<Text>,
        #[max_length = 50]
        kind -> Nullable<Varchar>,
        starts_at -> Timestamptz,
        ends_at -> Nullable<Timestamptz>,
        #[max_length = 100]
        location -> Nullable<Varchar>,
        staff_id -> Nullable<Int4>,
        max_participants -> Nullable<Int4>,
        #[max_length = 200]
        notes -> Nullable<Varchar>,
    }
}

diesel::table! {
    activity_participants (activity_id, resident_id) {
        activity_id -> Int4,
        resident_id -> Int4,
        attended -> Bool,
        rating -> Nullable<Int4>,
    }
}

diesel::table! {
    diets (id) {
        id -> Int4,
        #[max_length = 100]
        name -> Varchar,
        characteristics -> Nullable<Text>,
        active -> Bool,
    }
}

diesel::table! {
    diet_assignments (id) {
        id -> Int4,
        resident_id -> Int4,
        diet_id -> Int4,
        staff_id -> Nullable<Int4>,
        start_date -> Date,
        end_date -> Nullable<Date>,
        notes -> Nullable<Text>,
        active -> Bool,
    }
}

diesel::table! {
    visits (id) {
        id -> Int4,
        resident_id -> Int4,
        #[max_length = 100]
        visitor_name -> Varchar,
        #[max_length = 50]
        relationship -> Nullable<Varchar>,
        entered_at -> Timestamptz,
        left_at -> Nullable<Timestamptz>,
        notes -> Nullable<Text>,
    }
}

diesel::table! {
    incidents (id) {
        id -> Int4,
        occurred_at -> Timestamptz,
        description -> Text,
        #[max_length = 100]
        kind -> Varchar,
        #[max_length = 20]
        severity -> Varchar,
        #[max_length = 20]
        status -> Varchar,
        notes -> Nullable<Text>,
        resident_id -> Nullable<Int4>,
        reported_by -> Nullable<Int4>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    activities,
    activity_participants,
    diet_assignments,
    diets,
    incidents,
    medications,
    residents,
    room_changes,
    rooms,
    staff,
    treatments,
    users,
    visits,
);
