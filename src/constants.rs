pub mod limits {

    pub const USERNAME_MAX_LENGTH: usize = 150;

    pub const EMAIL_MAX_LENGTH: usize = 254;

    pub const PERSON_NAME_MAX_LENGTH: usize = 150;

    pub const NAME_MAX_LENGTH: usize = 256;

    pub const SLUG_MAX_LENGTH: usize = 50;

    pub const REVIEW_TEXT_MAX_LENGTH: usize = 256;
}

pub mod scores {

    pub const MIN_SCORE: i32 = 1;

    pub const MAX_SCORE: i32 = 10;
}

pub mod roles {

    pub const USER: &str = "user";

    pub const MODERATOR: &str = "moderator";

    pub const ADMIN: &str = "admin";
}

pub mod messages {

    pub const REQUIRED: &str = "This field is required.";

    pub const BLANK: &str = "This field may not be blank.";

    pub const DUPLICATE_REVIEW: &str = "You have already reviewed this title.";

    pub const DUPLICATE_TITLE: &str = "A title with this name already exists in the given category.";

    pub const INVALID_CODE: &str = "Invalid confirmation code.";

    pub const MAIL_FAILURE: &str = "Failed to send the confirmation email. Please try again later.";

    pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

    pub const EMAIL_TAKEN: &str = "A user with that email already exists.";

    pub const SLUG_TAKEN: &str = "An object with this slug already exists.";

    pub const SLUG_IMMUTABLE: &str = "Slug cannot be changed.";

    pub const NOT_FOUND: &str = "Not found.";

    pub const CONFLICT: &str = "The object was modified concurrently and conflicts with existing data.";
}

/// Reserved path segment under `/users/`; can never be used as a username.
pub const RESERVED_USERNAME: &str = "me";
