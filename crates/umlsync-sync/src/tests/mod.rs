mod codegen;
mod support;
