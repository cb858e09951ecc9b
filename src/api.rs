pub mod principal;
pub mod swagger_main;
pub mod task;

#[cfg(test)]
mod test_util;
