pub mod ast;
pub mod cst;
pub mod helpers;
pub mod kind;
pub mod lexer;
pub mod queries;
