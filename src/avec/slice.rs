//! Slice-based decoder implementation.

use alloc::vec::Vec;

use tracing::{debug, trace, warn};

use crate::sans::{
    check,
    cursor::Cursor,
    header::{FitHeader, HeaderError},
    stream::MessageStream,
};

use super::{CrcPolicy, DecodeOptions, Error, FromRecords};

/// Decode records from a slice of a document, publishing to a receiver.
///
/// Uses the default, strict [`DecodeOptions`]. This method is also
/// re-exported as `freewheel::avec::decode_slice`.
pub fn decode(r: &[u8], o: &mut impl FromRecords) -> Result<FitHeader, Error> {
    decode_with(r, o, &DecodeOptions::default())
}

/// Decode records from a slice of a document with explicit options.
///
/// Returns the document header. On error the receiver may hold records
/// from before the failure; callers wanting all-or-nothing output should
/// discard it, as [`crate::activity::decode_activity`] does.
pub fn decode_with(
    r: &[u8],
    o: &mut impl FromRecords,
    options: &DecodeOptions,
) -> Result<FitHeader, Error> {
    let mut c = Cursor::new(r);

    let prefix = c.take::<12>()?;
    let mut header = FitHeader::parse(prefix)?;

    if header.is_extended() {
        header = match header.clone().with_crc(c.take()?, &prefix) {
            Ok(header) => header,
            Err(HeaderError::CyclicRedundancyCheck { found, calculated })
                if options.crc == CrcPolicy::Lenient =>
            {
                warn!(found, calculated, "ignoring header CRC mismatch");
                FitHeader {
                    crc: Some(found),
                    ..header
                }
            }
            Err(err) => Err(err)?,
        };
    }

    debug!(
        header_size = header.header_size,
        protocol = header.protocol_version,
        profile = header.profile_version,
        data_size = header.data_size,
        "parsed file header"
    );

    let end = header.data_end(); // Offset to the end of the record section.

    // Apply the cyclic redundancy check before continuing.
    let mut tail = Cursor::new(r);
    let covered = tail.take_slice(end)?;
    let stored = tail.take::<2>()?;

    if let Err(err) = check::verify(covered, stored) {
        match options.crc {
            CrcPolicy::Strict => Err(err)?,
            CrcPolicy::Lenient => warn!(
                found = err.found,
                calculated = err.calculated,
                "ignoring file CRC mismatch"
            ),
        }
    }

    header.check_protocol()?;

    c.limit_to(end)?;
    let mut stream = MessageStream::new(c);

    let mut fields = Vec::new();
    let (mut messages, mut skipped) = (0usize, 0usize);

    while let Some(global) = stream.next_message(&mut fields)? {
        messages += 1;

        // Shadow the document receiver with that of a single record.
        let Some(o) = o.add_record(global) else {
            trace!(global, "skipping message without a receiver");
            skipped += 1;
            continue;
        };

        for field in &fields {
            o.add_field(field);
        }
    }

    debug!(messages, skipped, "decoded record section");

    Ok(header)
}
