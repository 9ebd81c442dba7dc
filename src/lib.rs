//! Cross compiles and packages Fyne applications inside prebuilt
//! toolchain containers, one container per target architecture.

pub mod commands;
