//! # SQLite Schema
//!
//! This module centralizes the table definitions for the SQLite provider.
//! Ownership is a plain `owner_id` column; cascades are performed explicitly
//! by the record layer, children first, inside a transaction.

pub const CREATE_USERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )";

pub const CREATE_PATIENTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS patients (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        identification TEXT NOT NULL,
        phone TEXT,
        other_notes TEXT,
        created_at TEXT NOT NULL
    )";

pub const CREATE_PATIENT_ANSWERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS patient_answers (
        id TEXT PRIMARY KEY,
        patient_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        question TEXT NOT NULL,
        answer TEXT
    )";

pub const CREATE_APPOINTMENTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        patient_id TEXT NOT NULL,
        patient_name TEXT NOT NULL,
        date TEXT NOT NULL,
        time TEXT NOT NULL,
        reason TEXT NOT NULL,
        created_at TEXT NOT NULL
    )";

pub const CREATE_CUSTOM_QUESTIONS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS custom_questions (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        text TEXT NOT NULL,
        created_at TEXT NOT NULL
    )";

pub const CREATE_QUESTIONNAIRES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS questionnaires (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        kind TEXT NOT NULL,
        created_at TEXT NOT NULL
    )";

pub const CREATE_QUESTIONS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS questions (
        id TEXT PRIMARY KEY,
        questionnaire_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        text TEXT NOT NULL
    )";

pub const CREATE_QUESTION_OPTIONS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS question_options (
        id TEXT PRIMARY KEY,
        question_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        text TEXT NOT NULL
    )";

pub const CREATE_QUESTIONNAIRE_RESPONSES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS questionnaire_responses (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        patient_snapshot TEXT NOT NULL,
        questionnaire_name TEXT NOT NULL,
        description TEXT,
        questions_snapshot TEXT NOT NULL,
        answers TEXT NOT NULL,
        created_at TEXT NOT NULL
    )";

pub const CREATE_DOCUMENTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        patient_id TEXT NOT NULL,
        original_name TEXT NOT NULL,
        mime_type TEXT NOT NULL,
        stored_name TEXT NOT NULL,
        url TEXT NOT NULL,
        uploaded_at TEXT NOT NULL
    )";

pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_PATIENTS_TABLE,
    CREATE_PATIENT_ANSWERS_TABLE,
    CREATE_APPOINTMENTS_TABLE,
    CREATE_CUSTOM_QUESTIONS_TABLE,
    CREATE_QUESTIONNAIRES_TABLE,
    CREATE_QUESTIONS_TABLE,
    CREATE_QUESTION_OPTIONS_TABLE,
    CREATE_QUESTIONNAIRE_RESPONSES_TABLE,
    CREATE_DOCUMENTS_TABLE,
    "CREATE INDEX IF NOT EXISTS idx_patients_owner ON patients (owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_owner ON appointments (owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments (patient_id)",
    "CREATE INDEX IF NOT EXISTS idx_questionnaires_owner ON questionnaires (owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_questions_questionnaire ON questions (questionnaire_id)",
    "CREATE INDEX IF NOT EXISTS idx_options_question ON question_options (question_id)",
    "CREATE INDEX IF NOT EXISTS idx_documents_patient ON documents (patient_id)",
];
