mod config;
mod exposin;
mod shaping;
mod sweep;
