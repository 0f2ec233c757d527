mod discovery;
mod helpers;
