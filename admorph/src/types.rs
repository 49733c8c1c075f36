pub type Label = char;
pub type StateId = u32;
pub type FlexModelIndex = u16;
