mod facade;
mod lexer;
mod preprocess;
mod properties;
