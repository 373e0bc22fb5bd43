use super::Outcome;
use crate::error::{Error, Result};
use crate::locate;
use crate::mutate::{self, Edit};
use crate::options::AnimateOptions;
use crate::selector::{Selection, ShapeSet};
use crate::span::SpanKind;

const TRANSFORM_TYPES: &[&str] = &["rotate", "scale", "translate", "skewX", "skewY"];

/// Builds the SMIL element: `animateTransform` for transform types, `animate` for any other
/// attribute name.
pub fn animation_element(kind: &str, values: &str, dur: &str, opts: &AnimateOptions) -> String {
    let mut el = if TRANSFORM_TYPES.contains(&kind) {
        let target = if kind == "rotate" {
            format!(r#"from="0" to="{values}""#)
        } else {
            format!(r#"values="{values}""#)
        };
        format!(r#"<animateTransform attributeName="transform" type="{kind}" {target}"#)
    } else {
        format!(r#"<animate attributeName="{kind}" values="{values}""#)
    };
    el.push_str(&format!(r#" dur="{dur}" repeatCount="{}""#, opts.repeat));
    if let Some(ease) = opts.ease {
        el.push_str(&format!(r#" calcMode="{}""#, ease.calc_mode()));
        if let Some(splines) = ease.key_splines() {
            el.push_str(&format!(r#" keySplines="{splines}""#));
        }
    }
    if TRANSFORM_TYPES.contains(&kind) {
        el.push_str(r#" additive="sum""#);
    }
    el.push_str("/>");
    el
}

/// Appends an animation as the last child of every selected element.
pub fn animate(
    doc: &str,
    selection: &Selection,
    kind: &str,
    values: &str,
    dur: &str,
    opts: &AnimateOptions,
) -> Result<Outcome> {
    if kind.is_empty() || values.is_empty() || dur.is_empty() {
        return Err(Error::usage("animate needs <type> <values> <duration>"));
    }
    let anim = animation_element(kind, values, dur, opts);
    let spans = locate::locate_spans(doc, selection, ShapeSet::Animatable)?;

    let edits = spans
        .iter()
        .map(|span| match span.kind {
            SpanKind::SelfClosing => Edit::replace(
                span.open_end - 2..span.open_end,
                format!(">{anim}</{}>", span.tag),
            ),
            SpanKind::Paired { close_start } => Edit::insert(close_start, anim.clone()),
            SpanKind::Unterminated => Edit::insert(span.open_end, anim.clone()),
        })
        .collect();
    let out = mutate::apply_edits(doc, edits)?;

    Ok(Outcome::changed(
        out,
        format!(
            "Added {kind} animation to {} {} element(s)",
            spans.len(),
            selection.label()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Ease, OptionPairs};

    fn sel(s: &str) -> Selection {
        Selection::parse(s).unwrap()
    }

    #[test]
    fn rotate_uses_from_to() {
        let el = animation_element("rotate", "360 50 50", "3s", &AnimateOptions::default());
        assert_eq!(
            el,
            r#"<animateTransform attributeName="transform" type="rotate" from="0" to="360 50 50" dur="3s" repeatCount="indefinite" additive="sum"/>"#
        );
    }

    #[test]
    fn plain_attribute_with_easing() {
        let opts = AnimateOptions {
            repeat: "2".to_string(),
            ease: Some(Ease::EaseOut),
        };
        let el = animation_element("opacity", "1;0;1", "2s", &opts);
        assert_eq!(
            el,
            r#"<animate attributeName="opacity" values="1;0;1" dur="2s" repeatCount="2" calcMode="spline" keySplines="0 0 0.58 1"/>"#
        );
    }

    #[test]
    fn self_closing_targets_become_paired() {
        let doc = r#"<svg><circle r="5"/><g id="a"><rect/></g></svg>"#;
        let opts = AnimateOptions::from_pairs(OptionPairs::default()).unwrap();
        let out = animate(doc, &sel("circle:0"), "r", "5;10;5", "1s", &opts).unwrap();
        assert_eq!(
            out.document,
            r#"<svg><circle r="5"><animate attributeName="r" values="5;10;5" dur="1s" repeatCount="indefinite"/></circle><g id="a"><rect/></g></svg>"#
        );
        assert_eq!(out.messages, vec!["Added r animation to 1 circle element(s)"]);
    }

    #[test]
    fn nested_targets_each_get_one_animation() {
        let doc = r#"<svg><g><rect/></g></svg>"#;
        let out = animate(doc, &sel("all"), "opacity", "0;1", "1s", &AnimateOptions::default())
            .unwrap();
        assert_eq!(out.document.matches("<animate ").count(), 2);
        assert!(out.document.contains("</rect><animate "));
        assert!(out.document.ends_with("/></g></svg>"));
    }
}
