use foundation::ids::RenderId;
use tracing::trace;

use crate::hit::{MapHit, ParcelLayer};
use crate::parcel::Properties;

/// A single `(layer, id)` feature-state address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HoverTarget {
    pub layer: ParcelLayer,
    pub id: RenderId,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Pointer,
}

/// Host-side feature-state and cursor, as far as hovering needs it.
pub trait HoverSink {
    fn set_hovered(&mut self, target: HoverTarget, hovered: bool);
    fn set_cursor(&mut self, cursor: Cursor);
}

/// Exclusive hover highlight across both parcel layers.
///
/// At most one target is hovered at any time: a new target is only set after
/// the previous one has been cleared on the host.
#[derive(Debug, Default)]
pub struct HoverController {
    current: Option<HoverTarget>,
    preview: Option<Properties>,
}

impl HoverController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<HoverTarget> {
        self.current
    }

    /// Properties of the hovered parcel, for a preview panel.
    pub fn preview(&self) -> Option<&Properties> {
        self.preview.as_ref()
    }

    pub fn pointer_move<S>(&mut self, hit: Option<&MapHit>, sink: &mut S)
    where
        S: HoverSink + ?Sized,
    {
        let Some(parcel) = hit.and_then(MapHit::parcel) else {
            self.clear(sink);
            sink.set_cursor(Cursor::Default);
            return;
        };

        let target = HoverTarget {
            layer: parcel.layer,
            id: parcel.render_id,
        };
        if self.current != Some(target) {
            self.clear(sink);
            trace!(layer = target.layer.source_name(), id = target.id.0, "hover");
            sink.set_hovered(target, true);
            self.current = Some(target);
        }
        self.preview = Some(parcel.feature.properties.clone());
        sink.set_cursor(Cursor::Pointer);
    }

    pub fn pointer_leave<S: HoverSink + ?Sized>(&mut self, sink: &mut S) {
        self.clear(sink);
        sink.set_cursor(Cursor::Default);
    }

    /// Drop the hover if it lives on `layer`, whose render ids are about to be reassigned.
    pub fn invalidate_layer<S: HoverSink + ?Sized>(&mut self, layer: ParcelLayer, sink: &mut S) {
        if self.current.is_some_and(|t| t.layer == layer) {
            self.clear(sink);
        }
    }

    fn clear<S: HoverSink + ?Sized>(&mut self, sink: &mut S) {
        if let Some(prev) = self.current.take() {
            sink.set_hovered(prev, false);
        }
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{Cursor, HoverController, HoverSink, HoverTarget};
    use crate::hit::{MapHit, ParcelHit, ParcelLayer};
    use crate::parcel::{GeoPoint, ParcelFeature, Polygon, Properties};
    use foundation::ids::{AddressId, RenderId};
    use std::collections::HashSet;

    #[derive(Default)]
    struct RecordingSink {
        hovered: HashSet<HoverTarget>,
        max_simultaneous: usize,
        log: Vec<(HoverTarget, bool)>,
        cursor: Option<Cursor>,
    }

    impl HoverSink for RecordingSink {
        fn set_hovered(&mut self, target: HoverTarget, hovered: bool) {
            if hovered {
                self.hovered.insert(target);
            } else {
                self.hovered.remove(&target);
            }
            self.max_simultaneous = self.max_simultaneous.max(self.hovered.len());
            self.log.push((target, hovered));
        }

        fn set_cursor(&mut self, cursor: Cursor) {
            self.cursor = Some(cursor);
        }
    }

    fn hit(layer: ParcelLayer, id: u32) -> MapHit {
        let mut props = Properties::new();
        props.insert("id".to_string(), id.into());
        let geometry = Polygon::new(vec![vec![GeoPoint::new(0.0, 0.0)]]);
        let feature = match layer {
            ParcelLayer::Main => ParcelFeature::main(AddressId::new("a"), geometry, props),
            ParcelLayer::Surrounding => ParcelFeature::surrounding(geometry, props),
        };
        MapHit::Parcel(ParcelHit {
            layer,
            render_id: RenderId(id),
            feature,
        })
    }

    fn target(layer: ParcelLayer, id: u32) -> HoverTarget {
        HoverTarget {
            layer,
            id: RenderId(id),
        }
    }

    #[test]
    fn moving_between_layers_keeps_one_hover() {
        let mut hover = HoverController::new();
        let mut sink = RecordingSink::default();

        hover.pointer_move(Some(&hit(ParcelLayer::Main, 0)), &mut sink);
        hover.pointer_move(Some(&hit(ParcelLayer::Surrounding, 0)), &mut sink);
        hover.pointer_move(Some(&hit(ParcelLayer::Surrounding, 3)), &mut sink);

        assert_eq!(sink.max_simultaneous, 1);
        assert_eq!(
            sink.log,
            vec![
                (target(ParcelLayer::Main, 0), true),
                (target(ParcelLayer::Main, 0), false),
                (target(ParcelLayer::Surrounding, 0), true),
                (target(ParcelLayer::Surrounding, 0), false),
                (target(ParcelLayer::Surrounding, 3), true),
            ]
        );
        assert_eq!(hover.current(), Some(target(ParcelLayer::Surrounding, 3)));
        assert_eq!(sink.cursor, Some(Cursor::Pointer));
        assert!(hover.preview().is_some());
    }

    #[test]
    fn same_target_is_not_reapplied() {
        let mut hover = HoverController::new();
        let mut sink = RecordingSink::default();
        hover.pointer_move(Some(&hit(ParcelLayer::Main, 1)), &mut sink);
        hover.pointer_move(Some(&hit(ParcelLayer::Main, 1)), &mut sink);
        assert_eq!(sink.log.len(), 1);
    }

    #[test]
    fn basemap_and_leave_clear_hover() {
        let mut hover = HoverController::new();
        let mut sink = RecordingSink::default();

        hover.pointer_move(Some(&hit(ParcelLayer::Main, 1)), &mut sink);
        hover.pointer_move(Some(&MapHit::Other), &mut sink);
        assert_eq!(hover.current(), None);
        assert!(sink.hovered.is_empty());
        assert_eq!(sink.cursor, Some(Cursor::Default));
        assert!(hover.preview().is_none());

        hover.pointer_move(Some(&hit(ParcelLayer::Surrounding, 2)), &mut sink);
        hover.pointer_leave(&mut sink);
        assert!(sink.hovered.is_empty());
        assert_eq!(sink.cursor, Some(Cursor::Default));

        // Leaving with nothing hovered only resets the cursor.
        let before = sink.log.len();
        hover.pointer_leave(&mut sink);
        assert_eq!(sink.log.len(), before);
    }

    #[test]
    fn invalidate_only_touches_its_layer() {
        let mut hover = HoverController::new();
        let mut sink = RecordingSink::default();
        hover.pointer_move(Some(&hit(ParcelLayer::Main, 4)), &mut sink);

        hover.invalidate_layer(ParcelLayer::Surrounding, &mut sink);
        assert_eq!(hover.current(), Some(target(ParcelLayer::Main, 4)));

        hover.invalidate_layer(ParcelLayer::Main, &mut sink);
        assert_eq!(hover.current(), None);
        assert!(sink.hovered.is_empty());
    }
}
