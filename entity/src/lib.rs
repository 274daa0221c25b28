pub mod user;

pub mod prelude {
    pub use super::user::Entity as User;
}
