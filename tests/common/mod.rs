use actix_web::{test, web, App};
use secrecy::Secret;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use fintrack::{account, auth, category, transaction, transfer};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

static JWT_SECRET: &str = "test_jwt_secret_for_integration_tests";

/// Statements bringing an empty database up to the layout the service
/// expects. All of them are idempotent so tests can share a database.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        full_name VARCHAR(100) NOT NULL,
        email VARCHAR(100) NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS account_categories (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transaction_categories (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id SERIAL PRIMARY KEY,
        user_id INT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name VARCHAR(100) NOT NULL,
        account_category_id INT NOT NULL REFERENCES account_categories(id),
        balance NUMERIC(18,2) NOT NULL DEFAULT 0,
        version INT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id SERIAL PRIMARY KEY,
        account_id INT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        category_id INT NOT NULL REFERENCES transaction_categories(id),
        amount NUMERIC(18,2) NOT NULL,
        transaction_date TIMESTAMPTZ NOT NULL,
        transaction_type CHAR(1) NOT NULL,
        description VARCHAR(500),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transfers (
        id SERIAL PRIMARY KEY,
        amount NUMERIC(18,2) NOT NULL,
        transfer_date TIMESTAMPTZ NOT NULL,
        from_account_id INT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        to_account_id INT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        user_id INT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        description VARCHAR(500),
        reference_number VARCHAR(40) NOT NULL UNIQUE,
        debit_transaction_id INT REFERENCES transactions(id) ON DELETE SET NULL,
        credit_transaction_id INT REFERENCES transactions(id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    INSERT INTO account_categories (id, name) VALUES
        (1, 'Checking'), (2, 'Savings'), (3, 'Credit Card'),
        (4, 'Investment'), (5, 'Cash')
    ON CONFLICT (id) DO NOTHING
    "#,
    r#"
    INSERT INTO transaction_categories (id, name) VALUES
        (1, 'Income'), (2, 'Food & Dining'), (3, 'Transportation'),
        (4, 'Shopping'), (5, 'Entertainment'), (6, 'Bills & Utilities'),
        (7, 'Healthcare'), (8, 'Education'), (9, 'Investment'), (10, 'Other')
    ON CONFLICT (id) DO NOTHING
    "#,
];

pub struct TestApp {
    pub pool: PgPool,
    pub test_id: String,
}

pub struct TestResponse {
    status: u16,
    body: bytes::Bytes,
}

impl TestResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub async fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }
}

impl TestApp {
    /// Connect to the test database, or None when no DATABASE_URL is
    /// configured (the calling test is skipped in that case).
    pub async fn spawn() -> Option<Self> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping integration test");
            return None;
        };

        let pool = match PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                eprintln!("Could not connect to test database ({e}); skipping integration test");
                return None;
            }
        };

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .expect("Failed to prepare test schema");
        }

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let test_id = format!("{timestamp}_{counter}");

        Some(TestApp { pool, test_id })
    }

    /// Generate a unique email for this test run
    pub fn unique_email(&self, prefix: &str) -> String {
        format!("{prefix}_{}@test.com", self.test_id)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(test::TestRequest::get(), path, None, token).await
    }

    pub async fn post(&self, path: &str, payload: &Value, token: Option<&str>) -> TestResponse {
        self.request(test::TestRequest::post(), path, Some(payload), token)
            .await
    }

    pub async fn put(&self, path: &str, payload: &Value, token: Option<&str>) -> TestResponse {
        self.request(test::TestRequest::put(), path, Some(payload), token)
            .await
    }

    pub async fn patch(&self, path: &str, payload: &Value, token: Option<&str>) -> TestResponse {
        self.request(test::TestRequest::patch(), path, Some(payload), token)
            .await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(test::TestRequest::delete(), path, None, token)
            .await
    }

    async fn request(
        &self,
        builder: test::TestRequest,
        path: &str,
        payload: Option<&Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let jwt_secret = Secret::new(JWT_SECRET.to_string());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(self.pool.clone()))
                .app_data(web::Data::new(jwt_secret))
                .service(auth::signup)
                .service(auth::signin)
                .service(auth::me)
                .service(account::list_accounts)
                .service(account::create_account)
                .service(account::update_account)
                .service(category::list_account_categories)
                .service(category::list_transaction_categories)
                .service(transaction::list_transactions)
                .service(transaction::create_transaction)
                .service(transaction::update_transaction)
                .service(transaction::delete_transaction)
                .service(transfer::create_transfer)
                .service(transfer::list_transfers)
                .service(transfer::get_transfer),
        )
        .await;

        let mut builder = builder.uri(path);
        if let Some(payload) = payload {
            builder = builder.set_json(payload);
        }
        if let Some(token) = token {
            builder = builder.insert_header(("Authorization", format!("Bearer {token}")));
        }

        let resp = test::call_service(&app, builder.to_request()).await;

        let status = resp.status().as_u16();
        let body = test::read_body(resp).await;

        TestResponse { status, body }
    }
}
