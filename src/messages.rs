//! User-facing message constants, shared between handlers and tests.

// Success
pub const SUCCESS: &str = "ok";
pub const LOGIN_SUCCESS: &str = "login successful";
pub const REGISTER_SUCCESS: &str = "registration successful";
pub const USER_STATUS: &str = "user status fetched";

// Validation
pub const EMPTY_CREDENTIALS: &str = "username or password cannot be empty";
pub const INVALID_REQUEST_BODY: &str = "invalid request body";
pub const INVALID_THEME: &str = "theme must be an integer";
pub const EMPTY_NEW_PASSWORD: &str = "new password cannot be empty";

// Auth
pub const MISSING_TOKEN: &str = "missing token";
pub const INVALID_TOKEN: &str = "invalid token";
pub const TOKEN_EXPIRED: &str = "token expired";

// Domain
pub const USER_NOT_FOUND: &str = "user does not exist";
pub const USER_ALREADY_EXISTS: &str = "user already exists";
pub const PASSWORD_INCORRECT: &str = "password incorrect";
pub const CATEGORY_NOT_FOUND: &str = "category does not exist";
pub const TODO_NOT_FOUND: &str = "todo does not exist";

// Store / internal. Clients only ever see this generic message; the detailed
// cause is logged server-side.
pub const SYSTEM_ERROR: &str = "system error, please try again later";
