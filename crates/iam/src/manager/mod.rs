mod access_key;
mod user;
