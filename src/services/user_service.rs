use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::auth::{
        ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
        ResetPasswordRequest, UpdateUserRequest, UserRequest, UserWithToken,
    },
    entity::{
        files::{Column as FileCol, Entity as Files},
        jwt_tokens::ActiveModel as JwtTokenActive,
        password_resets::{ActiveModel as PasswordResetActive, Entity as PasswordResets},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    jwt::IssuedToken,
    middleware::auth::AuthUser,
    models::{Order, User, user_from_entity},
    response::{ApiResponse, ListData, Meta},
    routes::params::OrderListQuery,
    services::{
        now, order_service,
        password::{hash_secret, verify_secret},
    },
    state::AppState,
};

pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

const LOGIN_FAILED: &str = "Failed to authenticate user";

/// Emails are stored and looked up lowercased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sign a token for `user` and record it in `jwt_tokens`.
pub(crate) async fn issue_token<C: ConnectionTrait>(
    state: &AppState,
    conn: &C,
    user: &UserModel,
) -> AppResult<IssuedToken> {
    let issued = state.jwt.issue(user.id, &user.email)?;
    JwtTokenActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        unique_id: Set(issued.claims.jti.clone()),
        token_title: Set(format!("{} access token", user.email)),
        expires_at: Set(issued.claims.expires_at().fixed_offset()),
        created_at: Set(issued.claims.issued_at().fixed_offset()),
    }
    .insert(conn)
    .await?;
    tracing::info!(user_id = %user.id, jti = %issued.claims.jti, "token issued");
    Ok(issued)
}

pub(crate) async fn find_live_user<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<UserModel>> {
    Ok(Users::find_by_id(id)
        .filter(UserCol::DeletedAt.is_null())
        .one(conn)
        .await?)
}

async fn find_live_user_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> AppResult<Option<UserModel>> {
    Ok(Users::find()
        .filter(UserCol::Email.eq(normalize_email(email)))
        .filter(UserCol::DeletedAt.is_null())
        .one(conn)
        .await?)
}

pub(crate) async fn ensure_email_free<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    if let Some(existing) = find_live_user_by_email(conn, email).await? {
        if Some(existing.id) != except {
            return Err(AppError::Unprocessable("Email is already taken".into()));
        }
    }
    Ok(())
}

pub(crate) async fn ensure_avatar_exists<C: ConnectionTrait>(
    conn: &C,
    avatar: Option<Uuid>,
) -> AppResult<()> {
    let Some(avatar) = avatar else {
        return Ok(());
    };
    let found = Files::find_by_id(avatar)
        .filter(FileCol::DeletedAt.is_null())
        .one(conn)
        .await?;
    if found.is_none() {
        return Err(AppError::Unprocessable("Avatar file does not exist".into()));
    }
    Ok(())
}

/// Register a user and hand back a first token. Admin creation reuses this.
pub async fn create_user(
    state: &AppState,
    payload: UserRequest,
    is_admin: bool,
) -> AppResult<ApiResponse<UserWithToken>> {
    let txn = state.orm.begin().await?;

    ensure_email_free(&txn, &payload.email, None).await?;
    ensure_avatar_exists(&txn, payload.avatar).await?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        is_admin: Set(is_admin),
        email: Set(normalize_email(&payload.email)),
        email_verified_at: Set(None),
        password_hash: Set(hash_secret(&payload.password)?),
        avatar: Set(payload.avatar),
        address: Set(payload.address),
        phone_number: Set(payload.phone_number),
        is_marketing: Set(payload.is_marketing.unwrap_or(false)),
        last_login_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let issued = issue_token(state, &txn, &user).await?;
    txn.commit().await?;

    tracing::info!(user_id = %user.id, is_admin, "user created");
    Ok(ApiResponse::success(
        "User created",
        UserWithToken {
            user: user_from_entity(user),
            token: issued.token,
        },
        Some(Meta::empty()),
    ))
}

/// Check credentials. `as_admin` selects which kind of account may log in.
pub async fn login(
    state: &AppState,
    payload: LoginRequest,
    as_admin: bool,
) -> AppResult<ApiResponse<LoginResponse>> {
    let txn = state.orm.begin().await?;

    let user = find_live_user_by_email(&txn, &payload.email)
        .await?
        .filter(|user| verify_secret(&user.password_hash, &payload.password))
        .ok_or_else(|| AppError::Unprocessable(LOGIN_FAILED.into()))?;

    if user.is_admin != as_admin {
        tracing::debug!(user_id = %user.id, as_admin, "login through the wrong endpoint");
        return Err(AppError::Unprocessable(LOGIN_FAILED.into()));
    }

    let issued = issue_token(state, &txn, &user).await?;

    let mut active: UserActive = user.into();
    active.last_login_at = Set(Some(now()));
    active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            expiry: issued.claims.expires_at(),
            token: issued.token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn profile(state: &AppState, auth: &AuthUser) -> AppResult<ApiResponse<User>> {
    let user = find_live_user(&state.orm, auth.user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(ApiResponse::success("User", user_from_entity(user), Some(Meta::empty())))
}

/// Apply a partial update to any live user.
pub(crate) async fn update_user(
    state: &AppState,
    user_id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let txn = state.orm.begin().await?;

    let user = find_live_user(&txn, user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if let Some(email) = payload.email.as_deref() {
        ensure_email_free(&txn, email, Some(user.id)).await?;
    }
    ensure_avatar_exists(&txn, payload.avatar).await?;

    let mut active: UserActive = user.into();
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(email) = payload.email {
        active.email = Set(normalize_email(&email));
    }
    if let Some(password) = payload.password {
        active.password_hash = Set(hash_secret(&password)?);
    }
    if let Some(address) = payload.address {
        active.address = Set(address);
    }
    if let Some(phone_number) = payload.phone_number {
        active.phone_number = Set(phone_number);
    }
    if let Some(is_marketing) = payload.is_marketing {
        active.is_marketing = Set(is_marketing);
    }
    if payload.avatar.is_some() {
        active.avatar = Set(payload.avatar);
    }
    active.updated_at = Set(now());
    let user = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("User updated", user_from_entity(user), Some(Meta::empty())))
}

pub async fn edit_profile(
    state: &AppState,
    auth: &AuthUser,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    update_user(state, auth.user_id, payload).await
}

pub(crate) async fn soft_delete_user(state: &AppState, user_id: Uuid) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    let user = find_live_user(&txn, user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    let mut active: UserActive = user.into();
    active.deleted_at = Set(Some(now()));
    active.update(&txn).await?;
    txn.commit().await?;
    tracing::info!(user_id = %user_id, "user deleted");
    Ok(())
}

pub async fn delete_account(
    state: &AppState,
    auth: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    soft_delete_user(state, auth.user_id).await?;
    Ok(ApiResponse::message("User deleted"))
}

pub async fn forgot_password(
    state: &AppState,
    auth: &AuthUser,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<ForgotPasswordResponse>> {
    if normalize_email(&payload.email) != normalize_email(&auth.email) {
        return Err(AppError::NotFound("User"));
    }

    let email = normalize_email(&auth.email);
    let txn = state.orm.begin().await?;
    PasswordResets::delete_by_id(email.clone()).exec(&txn).await?;

    let reset_token = Uuid::new_v4().simple().to_string();
    PasswordResetActive {
        email: Set(email),
        token_hash: Set(hash_secret(&reset_token)?),
        created_at: Set(now()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Reset token created",
        ForgotPasswordResponse { reset_token },
        Some(Meta::empty()),
    ))
}

/// Only the token holder's own password can be reset.
pub async fn reset_password(
    state: &AppState,
    auth: &AuthUser,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let email = normalize_email(&payload.email);
    if email != normalize_email(&auth.email) {
        return Err(AppError::NotFound("User"));
    }

    let invalid = || AppError::Unprocessable("Invalid or expired token".into());
    let txn = state.orm.begin().await?;

    let reset = PasswordResets::find_by_id(email.clone())
        .one(&txn)
        .await?
        .ok_or_else(invalid)?;

    let expires = reset.created_at.with_timezone(&Utc) + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
    if Utc::now() >= expires || !verify_secret(&reset.token_hash, &payload.token) {
        return Err(invalid());
    }

    let user = find_live_user_by_email(&txn, &email)
        .await?
        .ok_or_else(invalid)?;
    let mut active: UserActive = user.into();
    active.password_hash = Set(hash_secret(&payload.password)?);
    active.updated_at = Set(now());
    active.update(&txn).await?;

    PasswordResets::delete_by_id(email).exec(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::message("Password has been successfully updated"))
}

pub async fn my_orders(
    state: &AppState,
    auth: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<ListData<Order>>> {
    order_service::list_orders_for(state, Some(auth.user_id), query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_compared_lowercased_and_trimmed() {
        assert_eq!(normalize_email(" Jane.Doe@Example.COM "), "jane.doe@example.com");
        assert_eq!(normalize_email("jane.doe@example.com"), normalize_email("JANE.DOE@example.com"));
    }
}
