use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use sea_orm::*;
use secrecy::ExposeSecret;

use crate::{
    core::{config::Config, constants::ROLE_AUTHENTICATED, error::AppError},
    dtos::auth::{AuthResponse, Claims, LoginRequest, RegisterRequest},
    entity::users,
    extractors::identity::Identity,
    services::role as RoleService,
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid identifier or password";

/// 使用 Argon2 和随机盐值生成密码哈希。seed 创建用户时也走这里。
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalServerError(format!("Hash failed: {}", e)))
}

fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::InternalServerError("Auth failed".to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 签名密钥。生产环境未配置 JWT_SECRET 时为空，此时拒绝签发与校验。
fn jwt_secret(config: &Config) -> Option<&[u8]> {
    Some(config.jwt_secret.expose_secret().as_bytes()).filter(|key| !key.is_empty())
}

/// 签发访问令牌。纯函数，只依赖配置中的密钥和有效期。
pub fn issue_token(config: &Config, user: &users::Model) -> Result<String, AppError> {
    let secret = jwt_secret(config)
        .ok_or_else(|| AppError::InternalServerError("JWT_SECRET is not configured".to_string()))?;
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::seconds(config.jwt_expiration)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token generation failed: {}", e)))
}

pub fn decode_token(config: &Config, token: &str) -> Result<Claims, AppError> {
    let secret = jwt_secret(config).ok_or_else(|| {
        tracing::error!("❌ JWT_SECRET is not configured, rejecting token");
        AppError::AuthError("Invalid or expired token".to_string())
    })?;
    let decoding_key = DecodingKey::from_secret(secret);

    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("⚠️ Token validation failed: {}", e);
            AppError::AuthError("Invalid or expired token".to_string())
        })
}

/// 把 Bearer 令牌解析为请求身份：令牌必须有效，且对应的用户存在、未被封禁。
pub async fn authenticate(state: &AppState, token: &str) -> Result<Identity, AppError> {
    let claims = decode_token(&state.config, token)?;
    let user_id: i32 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid or expired token".to_string()))?;

    let user = users::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::AuthError("Invalid or expired token".to_string()))?;

    if user.blocked {
        tracing::warn!("🚫 Blocked user presented a token: {}", user.username);
        return Err(AppError::AuthError("Invalid or expired token".to_string()));
    }

    Ok(Identity {
        id: user.id,
        username: user.username,
        role_id: user.role_id,
    })
}

/// 用户注册。调用方必须先完成 `validate()`，这里只做唯一性检查和落库。
/// 新用户归入 authenticated 角色；邮箱统一转为小写。
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<AuthResponse, AppError> {
    let email = req.email.to_lowercase();

    // 第一步：唯一性检查。用户名和邮箱任一被占用都返回同一条消息。
    let taken = users::Entity::find()
        .filter(
            Condition::any()
                .add(users::Column::Email.eq(&email))
                .add(users::Column::Username.eq(&req.username)),
        )
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest("Email or Username are already taken".to_string()));
    }

    let role = RoleService::find_by_type(&state.db, ROLE_AUTHENTICATED)
        .await?
        .ok_or(AppError::InternalServerError("Impossible to find the default role".to_string()))?;

    // 第二步：落库。并发注册可能越过上面的检查，此时由唯一索引兜底。
    let now = Utc::now();
    let new_user = users::ActiveModel {
        username: Set(req.username),
        email: Set(email),
        password_hash: Set(hash_password(&req.password)?),
        provider: Set("local".to_string()),
        confirmed: Set(true),
        blocked: Set(false),
        role_id: Set(Some(role.id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| {
        let msg = e.to_string();
        if msg.contains("duplicate key") || msg.contains("UNIQUE constraint failed") {
            AppError::BadRequest("Email or Username are already taken".to_string())
        } else {
            AppError::DatabaseError(e)
        }
    })?;

    tracing::info!("👤 User registered: {}", user.username);

    Ok(AuthResponse {
        jwt: issue_token(&state.config, &user)?,
        user: user.into(),
    })
}

/// 用户登录。identifier 可以是邮箱或用户名。
/// 用户不存在与密码错误返回同一条消息，不暴露是哪一项出错。
pub async fn login(state: &AppState, req: LoginRequest) -> Result<AuthResponse, AppError> {
    let user = users::Entity::find()
        .filter(
            Condition::any()
                .add(users::Column::Email.eq(req.identifier.to_lowercase()))
                .add(users::Column::Username.eq(&req.identifier)),
        )
        .one(&state.db)
        .await?
        .ok_or(AppError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()));
    }

    if user.blocked {
        return Err(AppError::BadRequest(
            "Your account has been blocked by an administrator".to_string(),
        ));
    }

    Ok(AuthResponse {
        jwt: issue_token(&state.config, &user)?,
        user: user.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use secrecy::SecretString;

    fn register_req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("TestPassword123!").unwrap();
        assert!(verify_password("TestPassword123!", &hash).unwrap());
        assert!(!verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = Config::for_tests();
        let now = Utc::now();
        let user = users::Model {
            id: 7,
            username: "metest".to_string(),
            email: "metest@example.com".to_string(),
            password_hash: String::new(),
            provider: "local".to_string(),
            confirmed: true,
            blocked: false,
            firstname: None,
            lastname: None,
            reset_password_token: None,
            confirmation_token: None,
            role_id: None,
            created_at: now,
            updated_at: now,
        };
        let token = issue_token(&config, &user).unwrap();
        assert_eq!(decode_token(&config, &token).unwrap().sub, "7");

        let mut other = Config::for_tests();
        other.jwt_secret = "another-secret".into();
        assert!(matches!(decode_token(&other, &token), Err(AppError::AuthError(_))));
    }

    #[test]
    fn empty_secret_never_signs_or_accepts_tokens() {
        let config = Config::for_tests();
        let now = Utc::now();
        let user = users::Model {
            id: 8,
            username: "nosecret".to_string(),
            email: "nosecret@example.com".to_string(),
            password_hash: String::new(),
            provider: "local".to_string(),
            confirmed: true,
            blocked: false,
            firstname: None,
            lastname: None,
            reset_password_token: None,
            confirmation_token: None,
            role_id: None,
            created_at: now,
            updated_at: now,
        };
        let token = issue_token(&config, &user).unwrap();

        let mut empty = Config::for_tests();
        empty.jwt_secret = SecretString::from("");
        assert!(matches!(issue_token(&empty, &user), Err(AppError::InternalServerError(_))));
        assert!(matches!(decode_token(&empty, &token), Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn register_then_login_by_email_or_username() {
        let state = test_support::state().await;

        let registered = register(&state, register_req("testuser", "Test@Example.com", "TestPassword123!"))
            .await
            .unwrap();
        assert_eq!(registered.user.email, "test@example.com");
        assert!(!registered.jwt.is_empty());

        for identifier in ["test@example.com", "testuser"] {
            let res = login(
                &state,
                LoginRequest { identifier: identifier.to_string(), password: "TestPassword123!".to_string() },
            )
            .await
            .unwrap();
            assert_eq!(res.user.id, registered.user.id);
        }
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let state = test_support::state().await;
        register(&state, register_req("dupe", "dupe@example.com", "TestPassword123!")).await.unwrap();

        let err = register(&state, register_req("dupe", "other@example.com", "TestPassword123!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Email or Username are already taken"));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let state = test_support::state().await;
        register(&state, register_req("logintest", "logintest@example.com", "TestPassword123!")).await.unwrap();

        let wrong_password = login(
            &state,
            LoginRequest { identifier: "logintest@example.com".to_string(), password: "WrongPassword".to_string() },
        )
        .await
        .unwrap_err();
        let unknown_user = login(
            &state,
            LoginRequest { identifier: "nobody@example.com".to_string(), password: "WrongPassword".to_string() },
        )
        .await
        .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, AppError::BadRequest(ref m) if m == INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn blocked_user_cannot_authenticate() {
        let state = test_support::state().await;
        let res = register(&state, register_req("blocked", "blocked@example.com", "TestPassword123!"))
            .await
            .unwrap();

        let user = users::Entity::find_by_id(res.user.id).one(&state.db).await.unwrap().unwrap();
        let mut active: users::ActiveModel = user.into();
        active.blocked = Set(true);
        active.update(&state.db).await.unwrap();

        assert!(matches!(authenticate(&state, &res.jwt).await, Err(AppError::AuthError(_))));
        let err = login(
            &state,
            LoginRequest { identifier: "blocked".to_string(), password: "TestPassword123!".to_string() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("blocked")));
    }
}
