use super::*;

#[test]
fn display_includes_category_prefix() {
    assert_eq!(
        FramepackError::validation("bad rect").to_string(),
        "validation error: bad rect"
    );
    assert_eq!(
        FramepackError::encode("encoder died").to_string(),
        "encode error: encoder died"
    );
    assert_eq!(
        FramepackError::codec("truncated tag").to_string(),
        "codec error: truncated tag"
    );
}

#[test]
fn anyhow_errors_convert_transparently() {
    let err: FramepackError = anyhow::anyhow!("io went sideways").into();
    assert!(matches!(err, FramepackError::Other(_)));
    assert_eq!(err.to_string(), "io went sideways");
}

#[test]
fn question_mark_propagates_through_result_alias() {
    fn inner() -> FramepackResult<()> {
        Err(FramepackError::validation("nope"))
    }
    fn outer() -> FramepackResult<()> {
        inner()?;
        Ok(())
    }
    assert!(matches!(outer(), Err(FramepackError::Validation(_))));
}
