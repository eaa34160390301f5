pub mod yahoo_parser;
