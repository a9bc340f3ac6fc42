pub mod argentina_datos;

pub use argentina_datos::ArgentinaDatosProvider;
