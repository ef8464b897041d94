pub mod sitemap;
pub mod visits;
