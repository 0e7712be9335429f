use chrono::Utc;
use outreach_auth::{AuthError, Authenticator, Role};
use outreach_config::AuthConfig;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::str::FromStr;
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../database/migrations");

fn default_auth_config() -> AuthConfig {
    AuthConfig {
        session_ttl_seconds: 3_600,
    }
}

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new(config: AuthConfig) -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("auth.sqlite");
        let db_url = format!("sqlite://{}", db_path.display());

        let mut options = SqliteConnectOptions::from_str(&db_url)?;
        options = options.create_if_missing(true);
        options = options.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        let authenticator = Authenticator::new(pool.clone(), config);

        Ok(Self {
            pool,
            authenticator,
            _temp_dir: temp_dir,
        })
    }

    async fn new_default() -> TestResult<Self> {
        Self::new(default_auth_config()).await
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }
}

#[tokio::test]
async fn register_with_password_persists_user_and_password_identity() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let user = ctx
        .authenticator()
        .register_with_password("alice@example.com", "s3cret", Some("Alice"))
        .await?;

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(user.id)
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(user_count, 1, "user row should exist");

    let identity =
        sqlx::query("SELECT provider, provider_uid, secret FROM user_identities WHERE user_id = ?")
            .bind(user.id)
            .fetch_one(ctx.pool())
            .await?;

    let provider: String = identity.get("provider");
    let provider_uid: String = identity.get("provider_uid");
    let secret: String = identity.get("secret");

    assert_eq!(provider, "password");
    assert_eq!(provider_uid, "alice@example.com");
    assert!(
        secret.starts_with("$argon2"),
        "secret must be an argon2 hash"
    );
    assert_eq!(user.role, Role::Volunteer, "new users start as volunteers");

    Ok(())
}

#[tokio::test]
async fn register_with_password_rejects_duplicate_email() -> TestResult {
    let ctx = TestContext::new_default().await?;

    ctx.authenticator()
        .register_with_password("alice@example.com", "s3cret", None)
        .await?;

    let error = ctx
        .authenticator()
        .register_with_password("alice@example.com", "other", None)
        .await
        .expect_err("duplicate email must be rejected");

    assert!(matches!(error, AuthError::UserExists));
    Ok(())
}

#[tokio::test]
async fn login_with_password_issues_valid_session() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let user = ctx
        .authenticator()
        .register_with_password("alice@example.com", "s3cret", None)
        .await?;

    let session = ctx
        .authenticator()
        .login_with_password("alice@example.com", "s3cret")
        .await?;

    assert_eq!(session.user_id, user.id);
    assert!(session.expires_at > Utc::now());

    let (profile, authenticated) = ctx.authenticator().authenticate_token(&session.token).await?;
    assert_eq!(profile.id, user.id);
    assert_eq!(authenticated.token, session.token);

    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_fails() -> TestResult {
    let ctx = TestContext::new_default().await?;

    ctx.authenticator()
        .register_with_password("alice@example.com", "s3cret", None)
        .await?;

    let error = ctx
        .authenticator()
        .login_with_password("alice@example.com", "wrong")
        .await
        .expect_err("wrong password must be rejected");

    assert!(matches!(error, AuthError::InvalidCredentials));
    Ok(())
}

#[tokio::test]
async fn authenticate_unknown_token_fails() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let error = ctx
        .authenticator()
        .authenticate_token("no-such-token")
        .await
        .expect_err("unknown token must be rejected");

    assert!(matches!(error, AuthError::SessionNotFound));
    Ok(())
}

#[tokio::test]
async fn expired_session_is_rejected_and_removed() -> TestResult {
    let ctx = TestContext::new(AuthConfig {
        session_ttl_seconds: 0,
    })
    .await?;

    ctx.authenticator()
        .register_with_password("alice@example.com", "s3cret", None)
        .await?;
    let session = ctx
        .authenticator()
        .login_with_password("alice@example.com", "s3cret")
        .await?;

    let error = ctx
        .authenticator()
        .authenticate_token(&session.token)
        .await
        .expect_err("expired session must be rejected");
    assert!(matches!(error, AuthError::SessionExpired));

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE token = ?")
        .bind(&session.token)
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(remaining, 0, "expired session row should be deleted");

    Ok(())
}

#[tokio::test]
async fn set_role_promotes_user() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let user = ctx
        .authenticator()
        .register_with_password("founder@example.com", "s3cret", None)
        .await?;

    let promoted = ctx.authenticator().set_role(user.id, Role::Founder).await?;
    assert_eq!(promoted.role, Role::Founder);

    let found = ctx
        .authenticator()
        .find_user_by_public_id(&user.public_id)
        .await?
        .expect("user should be resolvable by public id");
    assert_eq!(found.role, Role::Founder);

    Ok(())
}
