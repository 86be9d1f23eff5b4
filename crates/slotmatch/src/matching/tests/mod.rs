mod common;
mod snapshots;
mod routing;
