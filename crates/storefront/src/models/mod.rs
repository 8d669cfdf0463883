//! Domain models for the marketplace.
//!
//! These are validated domain objects, separate from database rows. The
//! store implementations convert rows into them and reject rows that break
//! an invariant (a non-positive price, an unknown category).

pub mod cart;
pub mod live;
pub mod notification;
pub mod order;
pub mod product;
pub mod profile;
pub mod session;
pub mod user;

pub use cart::{Cart, CartLine};
pub use live::{ChatMessage, FeaturedProduct, LIVE_SESSION_ID};
pub use notification::Notification;
pub use order::{Order, OrderItem};
pub use product::{Product, ProductFields};
pub use profile::{Address, ProfileFields, UserProfile};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewAccount, UserAccount};
