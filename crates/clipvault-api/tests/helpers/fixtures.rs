//! Test fixtures: video-shaped blobs.
//!
//! The media tools are scripted, so the bytes only need to look like an MP4
//! to a human reading a failing test.

/// An `ftyp` box followed by `len` bytes of padding.
pub fn create_fake_mp4(len: usize) -> Vec<u8> {
    let mut data = vec![
        0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm', 0x00, 0x00, 0x02,
        0x00, b'i', b's', b'o', b'm', b'm', b'p', b'4', b'1',
    ];
    data.resize(data.len() + len, 0);
    data
}

pub fn create_minimal_mp4() -> Vec<u8> {
    create_fake_mp4(1024)
}
