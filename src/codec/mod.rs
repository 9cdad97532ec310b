pub mod bitmap_sequence;
pub mod composition_block;
pub mod image_tables;
pub mod stream;
pub mod tags;
pub mod video_sequence;
