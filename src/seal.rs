use num_complex::Complex;

pub trait Seal {}

impl Seal for f32 {}
impl Seal for f64 {}
impl Seal for i32 {}
impl Seal for i64 {}
impl Seal for u32 {}
impl Seal for u64 {}
impl Seal for Complex<f32> {}
impl Seal for Complex<f64> {}

impl Seal for crate::order::RowMajor {}
impl Seal for crate::order::ColMajor {}

impl Seal for crate::kernel::Assign {}
impl Seal for crate::kernel::AddAssign {}
impl Seal for crate::kernel::SubAssign {}
impl Seal for crate::kernel::MulAssign {}
impl Seal for crate::kernel::DivAssign {}
