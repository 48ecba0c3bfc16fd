use ndef_codec::ndef::{decode_tag_message, new_text_message, new_uri_message};
use ndef_codec::rtd::{TextRecord, abbreviate_uri, expand_uri};
use ndef_codec::types::{MessageView, RTD_SMART_POSTER, RTD_URI};
use ndef_codec::{
    NdefError, NdefMessage, NdefRecord, Tnf, VerifyConfig, new_message, new_message_with,
    new_smart_poster, unwrap_tlv, wrap_in_tlv,
};

fn round_trip(msg: &NdefMessage) -> NdefMessage {
    NdefMessage::from_bytes(&msg.to_bytes().unwrap()).unwrap()
}

#[test]
fn builder_messages_round_trip_field_for_field() {
    let long_payload = vec![0x42u8; 1000];
    let messages = vec![
        new_message([(Tnf::Empty, Vec::<u8>::new(), Vec::<u8>::new(), Vec::<u8>::new())]).unwrap(),
        new_message([
            (Tnf::MediaType, b"text/plain".to_vec(), b"1".to_vec(), b"hi".to_vec()),
            (Tnf::AbsoluteUri, b"http://a.b/c".to_vec(), Vec::new(), Vec::new()),
            (Tnf::External, b"example.com:t".to_vec(), Vec::new(), long_payload.clone()),
            (Tnf::Unknown, Vec::new(), Vec::new(), vec![1, 2, 3]),
        ])
        .unwrap(),
        new_message([(Tnf::WellKnown, b"act".to_vec(), Vec::<u8>::new(), vec![0xffu8])]).unwrap(),
        new_text_message("de", "Grüße").unwrap(),
        new_uri_message("mailto:someone@example.com").unwrap(),
        new_smart_poster("Title", "https://www.example.com/").unwrap(),
    ];

    for msg in &messages {
        let back = round_trip(msg);
        assert_eq!(back.len(), msg.len());
        for (a, b) in back.records().iter().zip(msg.records()) {
            assert_eq!(a.tnf(), b.tnf());
            assert_eq!(a.record_type(), b.record_type());
            assert_eq!(a.id(), b.id());
            assert_eq!(a.payload(), b.payload());
            assert_eq!(a.flags(), b.flags());
        }
        assert_eq!(msg.to_bytes().unwrap().len(), msg.encoded_len());
    }
}

#[test]
fn long_payload_switches_layout() {
    let msg = new_message([(Tnf::MediaType, "a/b", "", vec![0u8; 256])]).unwrap();
    let bytes = msg.to_bytes().unwrap();
    // MB | ME | TNF=MediaType, no SR
    assert_eq!(bytes[0], 0xc2);
    assert_eq!(&bytes[2..6], &256u32.to_le_bytes());
    assert_eq!(round_trip(&msg), msg);
}

#[test]
fn text_and_uri_helpers_read_back() {
    let msg = new_text_message("de", "Grüße").unwrap();
    let text = TextRecord::parse(msg.records()[0].payload()).unwrap();
    assert_eq!(text.language, "de");
    assert_eq!(text.text, "Grüße");

    for url in ["tel:+123", "urn:nfc:sn:1", "ftp://ftp.x.org", "custom:thing"] {
        let payload = abbreviate_uri(url);
        assert_eq!(expand_uri(&payload).unwrap(), url);
    }
}

fn raw_message(records: Vec<NdefRecord>) -> Vec<u8> {
    let last = records.len() - 1;
    let mut out = Vec::new();
    for (i, mut record) in records.into_iter().enumerate() {
        record.set_message_begin(i == 0);
        record.set_message_end(i == last);
        out.extend(record.to_bytes().unwrap());
    }
    out
}

/// Smart poster whose inner message holds a URI and, optionally, another smart poster.
fn nested_poster(levels: usize) -> Vec<u8> {
    let uri = || NdefRecord::new(Tnf::WellKnown, RTD_URI, "", abbreviate_uri("http://x")).unwrap();
    let mut inner = raw_message(vec![uri()]);
    for _ in 1..levels {
        let sp = NdefRecord::new(Tnf::WellKnown, RTD_SMART_POSTER, "", inner).unwrap();
        inner = raw_message(vec![uri(), sp]);
    }
    raw_message(vec![
        NdefRecord::new(Tnf::WellKnown, RTD_SMART_POSTER, "", inner).unwrap(),
    ])
}

#[test]
fn nesting_depth_is_bounded() {
    let two = nested_poster(2);
    assert!(NdefMessage::from_bytes(&two).is_ok());

    let shallow = VerifyConfig {
        max_nesting_depth: 1,
        ..VerifyConfig::default()
    };
    assert_eq!(
        NdefMessage::from_bytes_with(&two, &shallow),
        Err(NdefError::NestingTooDeep { limit: 1 })
    );

    let deep = nested_poster(64);
    assert_eq!(
        NdefMessage::from_bytes(&deep),
        Err(NdefError::NestingTooDeep { limit: 4 })
    );
}

#[test]
fn builder_honours_config() {
    let defs = [(Tnf::WellKnown, "", "", "")];
    assert_eq!(new_message(defs), Err(NdefError::MissingTypeOnFirstRecord));
    assert!(new_message_with(defs, &VerifyConfig::strict()).is_ok());
}

#[test]
fn smart_poster_payload_stays_a_message() {
    let msg = new_smart_poster("Github", "http://github.com/").unwrap();
    let inner = NdefMessage::from_bytes(msg.records()[0].payload()).unwrap();
    assert_eq!(inner.len(), 3);
    assert_eq!(expand_uri(inner.records()[0].payload()).unwrap(), "http://github.com/");
}

#[test]
fn tag_dump_round_trip() {
    let msg = new_smart_poster("Facebook", "http://www.facebook.com/").unwrap();
    let bytes = msg.to_bytes().unwrap();
    let mut dump = wrap_in_tlv(&bytes).unwrap();
    dump.extend_from_slice(&[0x00; 8]);

    assert_eq!(unwrap_tlv(&dump).unwrap(), &bytes[..]);
    let back = decode_tag_message(&dump, &VerifyConfig::default()).unwrap();
    assert_eq!(back, msg);
}

#[test]
fn json_view_shows_interpreted_fields() {
    let msg = new_smart_poster("Facebook", "http://www.facebook.com/").unwrap();
    let view = serde_json::to_value(MessageView::from(&msg)).unwrap();
    assert_eq!(view["length"], 45);
    let outer = &view["records"][0];
    assert_eq!(outer["tnf"], "well_known");
    assert_eq!(outer["type"], "5370");
    let nested = outer["records"].as_array().unwrap();
    assert_eq!(nested.len(), 3);
    assert_eq!(nested[0]["uri"], "http://www.facebook.com/");
    assert_eq!(nested[2]["text"], "Facebook");
    assert_eq!(nested[2]["language"], "en");
    assert!(nested[1].get("text").is_none());
}
