pub mod booking;
pub mod package;
pub mod settings;
pub mod trip;

/// Collection names in the document store.
pub mod collections {
    pub const BOOKINGS: &str = "reservas";
    pub const TRIPS: &str = "viagens";
    pub const PACKAGES: &str = "pacotes";
    pub const SETTINGS: &str = "settings";
    pub const BANNERS: &str = "banners";
    pub const BLOG_POSTS: &str = "blogPosts";
}
