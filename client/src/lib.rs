mod app;
mod board;
mod dom;
mod net;
mod saves;
mod state;
mod stroke;
mod ws;

pub use app::run;
