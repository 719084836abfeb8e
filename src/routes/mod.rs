pub(crate) mod not_found;
pub(crate) mod repository;
