/// User operations and merge rules
///
/// # Full replace (PUT)
///
/// Username, email and password are required and validated up front. Then,
/// in order: the username is set; a changed email must not belong to anyone
/// else; the new password must NOT match the current one (this check runs on
/// every PUT, so a PUT always changes the password); the password is
/// re-hashed; the authority is applied only for privileged callers.
///
/// # Partial update (PATCH)
///
/// Each supplied field is validated and applied only if it differs from the
/// stored value; a field sent as `null` counts as not supplied. Failures accumulate across fields and are reported
/// together; if any field fails, nothing is written.
///
/// # Privilege
///
/// The by-ID operations are privileged (administrator only) and may change
/// the authority. The `self` operations are unprivileged even for
/// administrators: authority input is silently ignored there.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::auth::authorization::{require_admin, resolve_caller};
use crate::auth::middleware::AuthContext;
use crate::auth::password::CredentialHasher;
use crate::error::{ServiceError, ServiceResult};
use crate::models::task::Task;
use crate::models::user::{Authority, CreateUser, LoginUser, NewUser, PatchUser, ReplaceUser, User};
use crate::repository::{TaskRepository, UserRepository};
use crate::validation::{self, has_whitespace, is_blank, is_valid_email, password_length_ok};

const SAME_PASSWORD: &str = "password can not be the same as the old one";
const BAD_CREDENTIALS: &str = "email or password are incorrect";

/// A user together with its tasks, for user views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithTasks {
    pub user: User,
    pub tasks: Vec<Task>,
}

/// Whether the caller may change privileged fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Admin,
    SelfService,
}

impl Privilege {
    fn is_admin(self) -> bool {
        matches!(self, Privilege::Admin)
    }
}

fn validated<T: Validate>(input: &T) -> ServiceResult<()> {
    input
        .validate()
        .map_err(|errors| ServiceError::InvalidUser(validation::messages(&errors)))
}

/// User use cases: registration, login, administration and self-service
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            users,
            tasks,
            hasher,
        }
    }

    async fn load(&self, id: Uuid) -> ServiceResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    async fn with_tasks(&self, user: User) -> ServiceResult<UserWithTasks> {
        let tasks = self.tasks.find_by_owner(user.id).await?;
        Ok(UserWithTasks { user, tasks })
    }

    async fn store(&self, user: &User) -> ServiceResult<User> {
        self.users
            .update(user)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    async fn email_taken(&self, current: &User, email: &str) -> ServiceResult<bool> {
        Ok(email != current.email && self.users.exists_by_email(email).await?)
    }

    // Registration and login

    /// Creates a user from registration input
    ///
    /// The supplied authority is honored only when `creator` is an
    /// authenticated administrator; everyone else gets `USER`.
    pub async fn register(
        &self,
        creator: Option<&AuthContext>,
        input: NewUser,
    ) -> ServiceResult<User> {
        let mut errors = input
            .validate()
            .err()
            .map(|errors| validation::messages(&errors))
            .unwrap_or_default();

        if self.users.exists_by_email(&input.email).await? {
            let taken = ServiceError::EmailAlreadyExists(input.email.clone());
            if errors.is_empty() {
                return Err(taken);
            }
            // `email` sorts first among the validated fields
            errors.insert(0, taken.to_string());
        }
        if !errors.is_empty() {
            return Err(ServiceError::InvalidUser(errors));
        }

        let authority = match creator {
            Some(auth) if auth.is_admin() => input.authority.unwrap_or_default(),
            _ => Authority::User,
        };

        let user = self
            .users
            .insert(CreateUser {
                username: input.username,
                email: input.email,
                password_hash: self.hasher.hash(&input.password)?,
                authority,
            })
            .await?;

        info!(user_id = %user.id, authority = %user.authority, "User registered");
        Ok(user)
    }

    /// Checks login credentials
    ///
    /// Unknown email and wrong password fail the same way.
    pub async fn authenticate(&self, input: LoginUser) -> ServiceResult<User> {
        validated(&input)?;

        let Some(user) = self.users.find_by_email(&input.email).await? else {
            debug!("Login for unknown email");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        if !self.hasher.matches(&input.password, &user.password_hash)? {
            debug!(user_id = %user.id, "Login with wrong password");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        Ok(user)
    }

    // Reads

    /// Every user with its tasks, oldest first
    pub async fn list_all(&self, auth: &AuthContext) -> ServiceResult<Vec<UserWithTasks>> {
        require_admin(auth)?;

        let mut by_owner: HashMap<Uuid, Vec<Task>> = HashMap::new();
        for task in self.tasks.find_all().await? {
            by_owner.entry(task.owner_id).or_default().push(task);
        }

        let users = self.users.find_all().await?;
        Ok(users
            .into_iter()
            .map(|user| {
                let tasks = by_owner.remove(&user.id).unwrap_or_default();
                UserWithTasks { user, tasks }
            })
            .collect())
    }

    pub async fn get(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<UserWithTasks> {
        require_admin(auth)?;
        let user = self.load(id).await?;
        self.with_tasks(user).await
    }

    pub async fn get_self(&self, auth: &AuthContext) -> ServiceResult<UserWithTasks> {
        let user = resolve_caller(self.users.as_ref(), auth).await?;
        self.with_tasks(user).await
    }

    // Full replace

    pub async fn replace(
        &self,
        auth: &AuthContext,
        id: Uuid,
        input: ReplaceUser,
    ) -> ServiceResult<UserWithTasks> {
        require_admin(auth)?;
        validated(&input)?;
        let user = self.load(id).await?;
        self.replace_user(user, input, Privilege::Admin).await
    }

    pub async fn replace_self(
        &self,
        auth: &AuthContext,
        input: ReplaceUser,
    ) -> ServiceResult<UserWithTasks> {
        validated(&input)?;
        let user = resolve_caller(self.users.as_ref(), auth).await?;
        self.replace_user(user, input, Privilege::SelfService).await
    }

    async fn replace_user(
        &self,
        current: User,
        input: ReplaceUser,
        privilege: Privilege,
    ) -> ServiceResult<UserWithTasks> {
        let mut user = current.clone();
        user.username = input.username;

        if self.email_taken(&current, &input.email).await? {
            return Err(ServiceError::EmailAlreadyExists(input.email));
        }
        user.email = input.email;

        if self.hasher.matches(&input.password, &current.password_hash)? {
            return Err(ServiceError::invalid_user(SAME_PASSWORD));
        }
        user.password_hash = self.hasher.hash(&input.password)?;

        if privilege.is_admin() {
            user.authority = input.authority.unwrap_or(current.authority);
        }

        let user = self.store(&user).await?;
        info!(user_id = %user.id, ?privilege, "User replaced");
        self.with_tasks(user).await
    }

    // Partial update

    pub async fn patch(
        &self,
        auth: &AuthContext,
        id: Uuid,
        input: PatchUser,
    ) -> ServiceResult<UserWithTasks> {
        require_admin(auth)?;
        let user = self.load(id).await?;
        self.patch_user(user, input, Privilege::Admin).await
    }

    pub async fn patch_self(
        &self,
        auth: &AuthContext,
        input: PatchUser,
    ) -> ServiceResult<UserWithTasks> {
        let user = resolve_caller(self.users.as_ref(), auth).await?;
        self.patch_user(user, input, Privilege::SelfService).await
    }

    async fn patch_user(
        &self,
        current: User,
        input: PatchUser,
        privilege: Privilege,
    ) -> ServiceResult<UserWithTasks> {
        let mut user = current.clone();
        let mut errors = Vec::new();

        if let Some(username) = input.username.as_value() {
            if *username != current.username {
                let mut field_errors = Vec::new();
                if has_whitespace(username) {
                    field_errors.push("username can not contain whitespaces".to_string());
                }
                if is_blank(username) {
                    field_errors.push("username must not be empty".to_string());
                }
                if field_errors.is_empty() {
                    user.username = username.clone();
                }
                errors.extend(field_errors);
            }
        }

        if let Some(email) = input.email.as_value() {
            if *email != current.email {
                if is_blank(email) {
                    errors.push("email must not be empty".to_string());
                } else if !is_valid_email(email) {
                    errors.push("invalid email".to_string());
                } else if self.email_taken(&current, email).await? {
                    errors.push(format!("email '{email}' is already taken"));
                } else {
                    user.email = email.clone();
                }
            }
        }

        if let Some(password) = input.password.as_value() {
            if self.hasher.matches(password, &current.password_hash)? {
                errors.push(SAME_PASSWORD.to_string());
            } else {
                let mut field_errors = Vec::new();
                if !password_length_ok(password) {
                    field_errors.push("password must be between 6 and 40 characters".to_string());
                }
                if is_blank(password) {
                    field_errors.push("password must not be empty".to_string());
                }
                if field_errors.is_empty() {
                    user.password_hash = self.hasher.hash(password)?;
                }
                errors.extend(field_errors);
            }
        }

        if let (true, Some(&authority)) = (privilege.is_admin(), input.authority.as_value()) {
            user.authority = authority;
        }

        if !errors.is_empty() {
            debug!(user_id = %current.id, errors = errors.len(), "Rejected user patch");
            return Err(ServiceError::InvalidUser(errors));
        }

        let user = if user == current {
            current
        } else {
            self.store(&user).await?
        };
        info!(user_id = %user.id, ?privilege, "User patched");
        self.with_tasks(user).await
    }

    // Deletion

    /// Deletes a user by ID; its tasks go with it
    pub async fn delete(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<()> {
        require_admin(auth)?;
        if !self.users.exists_by_id(id).await? {
            return Err(ServiceError::UserNotFound);
        }
        self.remove(id).await?;
        info!(user_id = %id, by = %auth.user_id, "User deleted");
        Ok(())
    }

    pub async fn delete_self(&self, auth: &AuthContext) -> ServiceResult<()> {
        let user = resolve_caller(self.users.as_ref(), auth).await?;
        self.remove(user.id).await?;
        info!(user_id = %user.id, "User deleted own account");
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> ServiceResult<()> {
        if self.users.delete(id).await? {
            Ok(())
        } else {
            Err(ServiceError::UserNotFound)
        }
    }
}
