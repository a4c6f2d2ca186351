pub(crate) mod caption;
pub(crate) mod cpu;
