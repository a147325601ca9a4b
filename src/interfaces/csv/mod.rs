pub mod basket_reader;
