// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tagged event stream emitted by layout mutations.

use latchwork_vocabulary::{
    DecorationId, LogicItemId, Offset, Segment, SegmentInfo, SegmentPart,
};

use crate::decoration::DecorationLayoutData;
use crate::logicitem::LogicItemLayoutData;

/// One layout mutation event.
///
/// The editing layer emits these synchronously while mutating the layout;
/// every derived index consumes the subset it cares about, in a fixed
/// registration order, before the mutating call returns. The variant set is
/// closed: a new mutation kind must extend every consumer's `match`.
///
/// `Inserted*` variants carry the layout data of the affected element so
/// that uninsert events can describe the state *before* the mutation without
/// a layout lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum InfoMessage {
    /// A logic item was added to the table, in any display state.
    LogicItemCreated {
        /// The new item.
        id: LogicItemId,
    },
    /// A logic item's dense id changed by swap-and-pop.
    LogicItemIdUpdated {
        /// Id after the swap.
        new_id: LogicItemId,
        /// Id before the swap.
        old_id: LogicItemId,
    },
    /// A logic item was removed from the table.
    LogicItemDeleted {
        /// The removed item's id at removal time.
        id: LogicItemId,
    },
    /// A logic item transitioned to the inserted (`Normal`) state.
    LogicItemInserted {
        /// The inserted item.
        id: LogicItemId,
        /// Shape data at insertion time.
        data: LogicItemLayoutData,
    },
    /// An inserted logic item's dense id changed.
    InsertedLogicItemIdUpdated {
        /// Id after the swap.
        new_id: LogicItemId,
        /// Id before the swap.
        old_id: LogicItemId,
        /// Shape data of the item.
        data: LogicItemLayoutData,
    },
    /// An inserted logic item left the inserted state.
    LogicItemUninserted {
        /// The item.
        id: LogicItemId,
        /// Shape data before the transition.
        data: LogicItemLayoutData,
    },

    /// A decoration was added to the table, in any display state.
    DecorationCreated {
        /// The new decoration.
        id: DecorationId,
    },
    /// A decoration's dense id changed by swap-and-pop.
    DecorationIdUpdated {
        /// Id after the swap.
        new_id: DecorationId,
        /// Id before the swap.
        old_id: DecorationId,
    },
    /// A decoration was removed from the table.
    DecorationDeleted {
        /// The removed decoration's id at removal time.
        id: DecorationId,
    },
    /// A decoration transitioned to the inserted state.
    DecorationInserted {
        /// The inserted decoration.
        id: DecorationId,
        /// Shape data at insertion time.
        data: DecorationLayoutData,
    },
    /// An inserted decoration's dense id changed.
    InsertedDecorationIdUpdated {
        /// Id after the swap.
        new_id: DecorationId,
        /// Id before the swap.
        old_id: DecorationId,
        /// Shape data of the decoration.
        data: DecorationLayoutData,
    },
    /// An inserted decoration left the inserted state.
    DecorationUninserted {
        /// The decoration.
        id: DecorationId,
        /// Shape data before the transition.
        data: DecorationLayoutData,
    },

    /// A segment was added to some tree, in any display state.
    SegmentCreated {
        /// The new segment.
        segment: Segment,
        /// Length of the segment's line.
        size: Offset,
    },
    /// A segment's index changed (tree renumbering or cross-tree move).
    SegmentIdUpdated {
        /// Reference after the change.
        new_segment: Segment,
        /// Reference before the change.
        old_segment: Segment,
    },
    /// A part of a segment moved to another segment (split, merge, or
    /// cross-tree move).
    SegmentPartMoved {
        /// Where the part now lives.
        destination: SegmentPart,
        /// Where the part came from.
        source: SegmentPart,
        /// Whether the destination segment was created by this move.
        create_destination: bool,
        /// Whether the source segment ceased to exist.
        delete_source: bool,
    },
    /// A part of an uninserted segment was deleted.
    SegmentPartDeleted {
        /// The removed part.
        segment_part: SegmentPart,
        /// Whether the whole segment ceased to exist.
        delete_segment: bool,
    },

    /// A segment entered an inserted tree; its endpoint types are now
    /// authoritative.
    SegmentInserted {
        /// The inserted segment.
        segment: Segment,
        /// Geometry and endpoint types at insertion time.
        info: SegmentInfo,
    },
    /// An inserted segment's reference changed.
    InsertedSegmentIdUpdated {
        /// Reference after the change.
        new_segment: Segment,
        /// Reference before the change.
        old_segment: Segment,
        /// Geometry and endpoint types of the segment.
        info: SegmentInfo,
    },
    /// An inserted segment's endpoint types changed without a geometry
    /// change.
    InsertedEndPointsUpdated {
        /// The segment.
        segment: Segment,
        /// Info after the change.
        new_info: SegmentInfo,
        /// Info before the change.
        old_info: SegmentInfo,
    },
    /// A segment left the inserted state.
    SegmentUninserted {
        /// The segment.
        segment: Segment,
        /// Geometry and endpoint types before the transition.
        info: SegmentInfo,
    },
}
