pub mod arq;
pub mod net;
pub mod wire;

#[cfg(test)]
mod test;
