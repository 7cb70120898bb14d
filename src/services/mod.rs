pub mod mailer;
pub use mailer::{ConsoleMailer, Email, FileMailer, MailError, Mailer};

pub mod tokens;
pub use tokens::{AccessTokens, ConfirmationCodes, TokenError};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{
    AuthError, AuthService, SignupRequest, SignupResult, TokenRequest, TokenResult,
};
pub use auth_service_impl::SeaOrmAuthService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{
    CatalogError, CatalogService, TermInfo, TermInput, TermKind, TitleInfo, TitleInput,
};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod review_service;
pub mod review_service_impl;
pub use review_service::{
    CommentInfo, CommentInput, ReviewError, ReviewInfo, ReviewInput, ReviewService,
};
pub use review_service_impl::SeaOrmReviewService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserInfo, UserInput, UserService, actor_from_model};
pub use user_service_impl::SeaOrmUserService;
