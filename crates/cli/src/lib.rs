pub mod roster_io;
