pub mod fixed_point;
pub mod modk;
pub mod numbers;
