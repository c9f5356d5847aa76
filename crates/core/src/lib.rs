pub mod auth;
pub mod config;
pub mod persistence;
pub mod remote;
pub mod session;
pub mod testing;
pub mod ticket;

pub use auth::{
    create_authenticator, AdminPasswordAuthenticator, AuthError, Authenticator, Credentials,
    Identity,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, Config, ConfigError,
    PersistenceBackend, PersistenceConfig, SanitizedConfig, ServerConfig,
};
pub use persistence::{
    create_persistence, load_or_empty, EphemeralAdapter, LoadOutcome, PersistenceAdapter,
    PersistenceError, RemoteFileAdapter,
};
pub use remote::{
    GithubConfig, GithubRepository, RemoteError, RemoteFile, RemoteRepository, VersionMarker,
};
pub use session::{DeskError, Session, SessionHandle, SessionManager, StatusUpdate};
pub use ticket::{
    NewTicket, Priority, StatusChange, Ticket, TicketError, TicketId, TicketStatus, TicketStore,
};
