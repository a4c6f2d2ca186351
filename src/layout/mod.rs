pub(crate) mod justified;
