pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Canadian Forest Fire Weather Index (Van Wagner, 1987)"
);
