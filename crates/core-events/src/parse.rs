//! `events.xml` parsing.
//!
//! One pull-parser pass over the document. Each `<event>` element is
//! materialized as a small map of its direct child elements' text, then
//! dispatched on `(module, eventname)`. Per-event failures are logged and
//! the event dropped; only an unreadable document or a document with no
//! events aborts.

use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use num_rational::Rational64;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;
use tracing::{debug, info, warn};

use core_geom::{Color, Position, Size};

use crate::errors::{EventLogError, EventParsingError};
use crate::version::{RecorderVersion, VersionGates};
use crate::{
    AddShapeEvent, CameraEvent, ClearEvent, CursorEvent, DeleteShapeEvent, Event, EventKind,
    JoinEvent, LeftEvent, LegacyShapeKind, PanZoomEvent, PencilCommand, PollAnswer,
    PresentationEvent, PresenterEvent, RecordEvent, ShapeEvent, ShapeStatus, SlideEvent,
    Timestamp, UndoEvent, WhiteboardCursorEvent, DEFAULT_PRESENTATION_POD,
};

/// Legacy pan offsets are recorded in half-percent units.
const LEGACY_PAN_SCALE: f64 = 2.0 / 100.0;

/// Result of parsing the whole document.
#[derive(Debug)]
pub struct ParsedEvents {
    /// Events in document order, timestamps rebased to the first event.
    pub events: VecDeque<Event>,
    /// Timestamp of the last event; the recording length.
    pub length: Timestamp,
    /// Metadata asked for the logo to be hidden on blank frames.
    pub hide_logo: bool,
    /// Recorder version quirks, normalized for downstream layers.
    pub gates: VersionGates,
    /// The raw recorder version, for logging.
    pub version: Option<RecorderVersion>,
}

/// Direct child elements of an `<event>`, name to text. Only elements that
/// actually contained text are present, matching the optional-subelement
/// semantics of the recorder format.
type SubMap = BTreeMap<String, String>;

/// Parse `<directory>/events.xml`.
pub fn parse_events(directory: &Path) -> Result<ParsedEvents, EventLogError> {
    let path = directory.join("events.xml");
    let content = std::fs::read_to_string(&path)?;
    parse_events_str(&content)
}

/// Parse an events document from a string (the file reader above, tests).
pub fn parse_events_str(content: &str) -> Result<ParsedEvents, EventLogError> {
    let mut reader = Reader::from_str(content);

    let mut version: Option<RecorderVersion> = None;
    let mut saw_root = false;
    let mut hide_logo = false;
    let mut gates = VersionGates::default();

    let mut events: VecDeque<Event> = VecDeque::new();
    let mut start_time: Option<i64> = None;
    let mut last_timestamp: Option<Timestamp> = None;
    let mut have_record_events = false;

    let mut depth: usize = 0;

    loop {
        match reader.read_event()? {
            XmlEvent::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !saw_root {
                    saw_root = true;
                    version = root_version(&e)?;
                    gates = VersionGates::from_version(version);
                    info!(target: "events.parse", version = %version.map(|v| v.to_string()).unwrap_or_else(|| "unknown".into()), ?gates, "recorder version");
                    depth += 1;
                    continue;
                }
                if depth == 1 && name == "metadata" {
                    hide_logo = metadata_hide_logo(&e)?;
                    depth += 1;
                    continue;
                }
                if depth == 1 && name == "event" {
                    let attrs = EventAttrs::from_start(&e)?;
                    let subs = read_event_children(&mut reader)?;
                    // depth is unchanged: read_event_children consumed the
                    // matching end tag.
                    handle_event(
                        &attrs,
                        subs,
                        &gates,
                        &mut events,
                        &mut start_time,
                        &mut last_timestamp,
                        &mut have_record_events,
                    );
                    continue;
                }
                depth += 1;
            }
            XmlEvent::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if depth == 1 && name == "metadata" {
                    hide_logo = metadata_hide_logo(&e)?;
                } else if depth == 1 && name == "event" {
                    // A childless event still carries a timestamp and
                    // contributes to the recording length.
                    let attrs = EventAttrs::from_start(&e)?;
                    handle_event(
                        &attrs,
                        SubMap::new(),
                        &gates,
                        &mut events,
                        &mut start_time,
                        &mut last_timestamp,
                        &mut have_record_events,
                    );
                }
            }
            XmlEvent::End(_) => {
                depth = depth.saturating_sub(1);
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    let length = last_timestamp.ok_or(EventLogError::NoEvents)?;

    if !have_record_events {
        // No explicit record events: treat the whole session as recorded.
        events.push_front(Event {
            timestamp: Rational64::from_integer(0),
            kind: EventKind::Record(RecordEvent { status: true }),
        });
    }

    info!(
        target: "events.parse",
        count = events.len(),
        length = %length,
        hide_logo,
        "parsed events"
    );

    Ok(ParsedEvents {
        events,
        length,
        hide_logo,
        gates,
        version,
    })
}

fn root_version(e: &BytesStart<'_>) -> Result<Option<RecorderVersion>, EventLogError> {
    match e.try_get_attribute("bbb_version")? {
        Some(attr) => {
            let value = attr.unescape_value()?;
            Ok(RecorderVersion::parse(&value))
        }
        None => Ok(None),
    }
}

fn metadata_hide_logo(e: &BytesStart<'_>) -> Result<bool, EventLogError> {
    match e.try_get_attribute("bn-rec-hide-logo")? {
        Some(attr) => Ok(attr.unescape_value()?.as_ref() == "true"),
        None => Ok(false),
    }
}

struct EventAttrs {
    timestamp_ms: i64,
    module: String,
    eventname: String,
}

impl EventAttrs {
    fn from_start(e: &BytesStart<'_>) -> Result<Self, EventLogError> {
        let timestamp = e
            .try_get_attribute("timestamp")?
            .ok_or(EventLogError::MissingAttribute("timestamp"))?
            .unescape_value()?
            .into_owned();
        let timestamp_ms = timestamp
            .trim()
            .parse::<i64>()
            .map_err(|_| EventLogError::BadTimestamp(timestamp))?;
        let module = e
            .try_get_attribute("module")?
            .ok_or(EventLogError::MissingAttribute("module"))?
            .unescape_value()?
            .into_owned();
        let eventname = e
            .try_get_attribute("eventname")?
            .ok_or(EventLogError::MissingAttribute("eventname"))?
            .unescape_value()?
            .into_owned();
        Ok(Self {
            timestamp_ms,
            module,
            eventname,
        })
    }
}

/// Consume the body of an `<event>` element up to its end tag, collecting
/// text of direct children. Deeper nesting is skipped. The first occurrence
/// of a child name wins, like a document-order `find`.
fn read_event_children(reader: &mut Reader<&[u8]>) -> Result<SubMap, EventLogError> {
    let mut map = SubMap::new();
    let mut depth = 0usize;
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event()? {
            XmlEvent::Start(e) => {
                depth += 1;
                if depth == 1 {
                    current = Some((
                        String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                        String::new(),
                    ));
                }
            }
            XmlEvent::Text(t) => {
                if depth == 1 {
                    if let Some((_, text)) = current.as_mut() {
                        text.push_str(&t.unescape()?);
                    }
                }
            }
            XmlEvent::CData(t) => {
                if depth == 1 {
                    if let Some((_, text)) = current.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&t));
                    }
                }
            }
            XmlEvent::End(_) => {
                if depth == 0 {
                    // End of the <event> element itself.
                    return Ok(map);
                }
                if depth == 1 {
                    if let Some((name, text)) = current.take() {
                        map.entry(name).or_insert(text);
                    }
                }
                depth -= 1;
            }
            XmlEvent::Empty(_) => {
                // An empty child has no text; same as an absent one.
            }
            XmlEvent::Eof => return Ok(map),
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_event(
    attrs: &EventAttrs,
    subs: SubMap,
    gates: &VersionGates,
    events: &mut VecDeque<Event>,
    start_time: &mut Option<i64>,
    last_timestamp: &mut Option<Timestamp>,
    have_record_events: &mut bool,
) {
    // Timestamps are rebased on the first event in the document, whatever
    // its module; the recording length tracks every event too.
    let start = *start_time.get_or_insert(attrs.timestamp_ms);
    let timestamp = Rational64::new(attrs.timestamp_ms - start, 1000);
    *last_timestamp = Some(timestamp);

    match dispatch_event(attrs, &subs, gates, have_record_events) {
        Ok(Some(kind)) => {
            debug!(target: "events.parse", timestamp = %timestamp, name = kind.name(), "event");
            events.push_back(Event { timestamp, kind });
        }
        Ok(None) => {}
        Err(e) => {
            warn!(target: "events.parse", timestamp = %timestamp, error = %e, "dropping event");
        }
    }
}

fn dispatch_event(
    attrs: &EventAttrs,
    subs: &SubMap,
    gates: &VersionGates,
    have_record_events: &mut bool,
) -> Result<Option<EventKind>, EventParsingError> {
    let name = attrs.eventname.as_str();
    match attrs.module.as_str() {
        "PARTICIPANT" => match name {
            "AssignPresenterEvent" => {
                if gates.use_pod_presenter {
                    // Duplicate of the per-pod presenter event.
                    Ok(None)
                } else {
                    Ok(Some(EventKind::Presenter(PresenterEvent {
                        user_id: sub(subs, name, "userid")?.to_owned(),
                        pod_id: DEFAULT_PRESENTATION_POD.to_owned(),
                    })))
                }
            }
            "ParticipantJoinEvent" => Ok(Some(EventKind::Join(JoinEvent {
                user_id: sub(subs, name, "userId")?.to_owned(),
                user_name: sub(subs, name, "name")?.to_owned(),
            }))),
            "ParticipantLeftEvent" => Ok(Some(EventKind::Left(LeftEvent {
                user_id: sub(subs, name, "userId")?.to_owned(),
            }))),
            "RecordStatusEvent" => {
                let status = sub(subs, name, "status")? == "true";
                *have_record_events = true;
                Ok(Some(EventKind::Record(RecordEvent { status })))
            }
            // Other participant events cannot affect rendering.
            _ => Ok(None),
        },
        "PRESENTATION" => match name {
            "CursorMoveEvent" => Ok(Some(EventKind::Cursor(parse_cursor(subs, name)?))),
            "GotoSlideEvent" => Ok(Some(EventKind::Slide(SlideEvent {
                slide: sub_i64(subs, name, "slide")?,
                pod_id: pod_id(subs),
            }))),
            "ResizeAndMoveSlideEvent" => Ok(Some(EventKind::PanZoom(parse_pan_zoom(
                subs,
                name,
                gates.tldraw_whiteboard,
            )?))),
            "SetPresenterInPodEvent" => Ok(Some(EventKind::Presenter(PresenterEvent {
                user_id: sub(subs, name, "nextPresenterId")?.to_owned(),
                pod_id: sub(subs, name, "podId")?.to_owned(),
            }))),
            "SharePresentationEvent" => Ok(Some(EventKind::Presentation(PresentationEvent {
                presentation: sub(subs, name, "presentationName")?.to_owned(),
                pod_id: pod_id(subs),
            }))),
            "TldrawCameraChangedEvent" => Ok(Some(EventKind::TldrawCamera(CameraEvent {
                pod: sub(subs, name, "podId")?.to_owned(),
                presentation: sub(subs, name, "presentationName")?.to_owned(),
                camera: Position::new(
                    sub_f64(subs, name, "xCamera")?,
                    sub_f64(subs, name, "yCamera")?,
                ),
                zoom: sub_f64(subs, name, "zoom")?,
            }))),
            // Known but unused.
            "CreatePresentationPodEvent"
            | "ConversionCompletedEvent"
            | "GenerateSlideEvent"
            | "SetPresentationDownloadable" => Ok(None),
            _ => Err(EventParsingError::UnknownEvent(name.to_owned())),
        },
        "WHITEBOARD" => match name {
            "AddShapeEvent" | "ModifyTextEvent" => {
                Ok(Some(EventKind::Shape(parse_shape(subs, name, gates)?)))
            }
            "AddTldrawShapeEvent" => Ok(Some(EventKind::TldrawAddShape(AddShapeEvent {
                id: sub(subs, name, "shapeId")?.to_owned(),
                presentation: sub(subs, name, "presentation")?.to_owned(),
                slide: sub_i64(subs, name, "pageNumber")?,
                user_id: sub(subs, name, "userId")?.to_owned(),
                data: serde_json::from_str(sub(subs, name, "shapeData")?).map_err(|source| {
                    EventParsingError::InvalidJson {
                        eventname: name.to_owned(),
                        name: "shapeData".to_owned(),
                        source,
                    }
                })?,
            }))),
            "ClearPageEvent" | "ClearWhiteboardEvent" => Ok(Some(EventKind::Clear(ClearEvent {
                presentation: sub_opt(subs, "presentation").map(str::to_owned),
                slide: shape_slide(subs, gates.shape_slide_off_by_one)?,
                user_id: sub_opt(subs, "userId").map(str::to_owned),
                full_clear: sub_opt(subs, "fullClear").map(|v| v == "true"),
            }))),
            "DeleteTldrawShapeEvent" => Ok(Some(EventKind::TldrawDeleteShape(DeleteShapeEvent {
                id: sub(subs, name, "shapeId")?.to_owned(),
                presentation: sub(subs, name, "presentation")?.to_owned(),
                slide: sub_i64(subs, name, "pageNumber")?,
                user_id: sub(subs, name, "userId")?.to_owned(),
            }))),
            "UndoShapeEvent" | "UndoAnnotationEvent" => Ok(Some(EventKind::Undo(UndoEvent {
                presentation: sub_opt(subs, "presentation").map(str::to_owned),
                slide: shape_slide(subs, gates.shape_slide_off_by_one)?,
                user_id: sub_opt(subs, "userId").map(str::to_owned),
                shape_id: sub_opt(subs, "shapeId").map(str::to_owned),
            }))),
            "WhiteboardCursorMoveEvent" => Ok(Some(EventKind::WhiteboardCursor(
                parse_whiteboard_cursor(subs, name, gates.tldraw_whiteboard)?,
            ))),
            _ => Err(EventParsingError::UnknownEvent(name.to_owned())),
        },
        // Not interested in events from other modules.
        _ => Ok(None),
    }
}

fn parse_cursor(subs: &SubMap, name: &str) -> Result<CursorEvent, EventParsingError> {
    let x = sub_f64(subs, name, "xOffset")?;
    let y = sub_f64(subs, name, "yOffset")?;
    // Outside the slide (or NaN) means hidden.
    let cursor = if (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y) {
        Some(Position::new(x, y))
    } else {
        None
    };
    Ok(CursorEvent { cursor })
}

fn parse_whiteboard_cursor(
    subs: &SubMap,
    name: &str,
    tldraw_whiteboard: bool,
) -> Result<WhiteboardCursorEvent, EventParsingError> {
    let presentation = sub_opt(subs, "presentation").map(str::to_owned);
    let slide = match sub_opt(subs, "pageNumber") {
        Some(v) => Some(parse_num(v, name, "pageNumber")?),
        None => None,
    };

    let x_offset = sub_f64(subs, name, "xOffset")?;
    let y_offset = sub_f64(subs, name, "yOffset")?;
    let cursor = if tldraw_whiteboard {
        // Absolute position in shapes space; negative means hidden.
        if x_offset >= 0.0 && y_offset >= 0.0 {
            Some(Position::new(x_offset, y_offset))
        } else {
            None
        }
    } else {
        // Percent of the slide.
        let x = x_offset / 100.0;
        let y = y_offset / 100.0;
        if (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y) {
            Some(Position::new(x, y))
        } else {
            None
        }
    };

    Ok(WhiteboardCursorEvent {
        presentation,
        slide,
        cursor,
        user_id: sub(subs, name, "userId")?.to_owned(),
    })
}

fn parse_pan_zoom(
    subs: &SubMap,
    name: &str,
    tldraw_whiteboard: bool,
) -> Result<PanZoomEvent, EventParsingError> {
    let x_offset = sub(subs, name, "xOffset")?;
    let y_offset = sub(subs, name, "yOffset")?;
    // The recorder can emit literal 'NaN' offsets; substitute a neutral pan.
    let pan = if x_offset.trim() == "NaN" || y_offset.trim() == "NaN" {
        Position::new(0.0, 0.0)
    } else {
        let x = parse_num::<f64>(x_offset, name, "xOffset")?;
        let y = parse_num::<f64>(y_offset, name, "yOffset")?;
        if tldraw_whiteboard {
            Position::new(x, y)
        } else {
            Position::new(x * LEGACY_PAN_SCALE, y * LEGACY_PAN_SCALE)
        }
    };

    let width_ratio = sub(subs, name, "widthRatio")?;
    let height_ratio = sub(subs, name, "heightRatio")?;
    let mut zoom = if width_ratio.trim() == "NaN" || height_ratio.trim() == "NaN" {
        Size::new(1.0, 1.0)
    } else {
        Size::new(
            parse_num::<f64>(width_ratio, name, "widthRatio")? / 100.0,
            parse_num::<f64>(height_ratio, name, "heightRatio")? / 100.0,
        )
    };
    // A zero or negative ratio would divide by zero downstream.
    if zoom.width <= 0.0 || zoom.height <= 0.0 {
        zoom = Size::new(1.0, 1.0);
    }

    Ok(PanZoomEvent {
        pan,
        zoom,
        pod_id: pod_id(subs),
    })
}

fn parse_shape(
    subs: &SubMap,
    name: &str,
    gates: &VersionGates,
) -> Result<ShapeEvent, EventParsingError> {
    let shape_type = sub(subs, name, "type")?;
    let kind = LegacyShapeKind::from_name(shape_type).ok_or_else(|| {
        EventParsingError::UnknownShape {
            eventname: name.to_owned(),
            shape: shape_type.to_owned(),
        }
    })?;

    let mut shape = ShapeEvent::new(kind);
    shape.shape_id = sub_opt(subs, "id").map(str::to_owned);
    shape.presentation = sub_opt(subs, "presentation").map(str::to_owned);
    shape.slide = shape_slide(subs, gates.shape_slide_off_by_one)?;

    if let Some(status) = sub_opt(subs, "status") {
        shape.status = Some(ShapeStatus::from_name(status).ok_or_else(|| {
            EventParsingError::UnknownShapeStatus {
                eventname: name.to_owned(),
                status: status.to_owned(),
            }
        })?);
    }

    shape.user_id = sub_opt(subs, "userId").map(str::to_owned);

    // A missing dataPoints happens on e.g. pencil DRAW_END when server-side
    // smoothing failed; the existing shape is kept as-is.
    let data_points =
        sub_opt(subs, "dataPoints").ok_or_else(|| EventParsingError::ShapeNoDataPoints {
            eventname: name.to_owned(),
            shape: shape_type.to_owned(),
            status: format!("{:?}", shape.status),
        })?;

    let values: Vec<f64> = data_points
        .split(',')
        .map(|v| parse_num::<f64>(v, name, "dataPoints"))
        .collect::<Result<_, _>>()?;
    shape.points = values
        .chunks_exact(2)
        .map(|p| Position::new(p[0] / 100.0, p[1] / 100.0))
        .collect();

    if kind.is_drawn() {
        shape.color = Color::from_int(sub_i64(subs, name, "color")? as u32);
        let thickness = sub_f64(subs, name, "thickness")?;
        if gates.shape_thickness_percent {
            shape.thickness_ratio = Some(thickness / 100.0);
        } else {
            shape.thickness = Some(thickness);
        }
    }

    // Pencil is always rounded; other shapes follow the version gate.
    shape.rounded = gates.shape_rounded || kind == LegacyShapeKind::Pencil;

    match kind {
        LegacyShapeKind::Rectangle => {
            shape.square = sub_opt(subs, "square") == Some("true");
        }
        LegacyShapeKind::Ellipse => {
            shape.circle = sub_opt(subs, "circle") == Some("true");
        }
        LegacyShapeKind::Pencil => {
            if let Some(commands) = sub_opt(subs, "commands") {
                let mut parsed = Vec::new();
                for c in commands.split(',') {
                    let i = parse_num::<i64>(c, name, "commands")?;
                    parsed.push(PencilCommand::from_int(i).ok_or_else(|| {
                        EventParsingError::InvalidNumber {
                            eventname: name.to_owned(),
                            name: "commands".to_owned(),
                            value: c.to_owned(),
                        }
                    })?);
                }
                shape.commands = Some(parsed);
            }
        }
        LegacyShapeKind::PollResult => {
            shape.num_responders = sub_i64(subs, name, "num_responders")?;
            shape.num_respondents = sub_i64(subs, name, "num_respondents")?;
            shape.result = parse_poll_result(sub(subs, name, "result")?, name)?;
        }
        LegacyShapeKind::Text => {
            // The X and Y are duplicated from the dataPoints list.
            shape.width = sub_f64(subs, name, "textBoxWidth")? / 100.0;
            shape.height = sub_f64(subs, name, "textBoxHeight")? / 100.0;
            shape.font_color = Color::from_int(sub_i64(subs, name, "fontColor")? as u32);
            shape.font_size = sub_f64(subs, name, "fontSize")?;
            shape.calced_font_size = sub_f64(subs, name, "calcedFontSize")? / 100.0;
            shape.text = sub_opt(subs, "text").unwrap_or_default().to_owned();
        }
        _ => {}
    }

    Ok(shape)
}

fn parse_poll_result(raw: &str, name: &str) -> Result<Vec<PollAnswer>, EventParsingError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| EventParsingError::InvalidJson {
            eventname: name.to_owned(),
            name: "result".to_owned(),
            source,
        })?;
    let mut answers = Vec::new();
    if let Some(items) = value.as_array() {
        for item in items {
            answers.push(PollAnswer {
                key: item
                    .get("key")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_owned(),
                num_votes: item.get("num_votes").and_then(|v| v.as_i64()).unwrap_or(0),
            });
        }
    }
    Ok(answers)
}

fn pod_id(subs: &SubMap) -> String {
    sub_opt(subs, "podId")
        .unwrap_or(DEFAULT_PRESENTATION_POD)
        .to_owned()
}

fn sub_opt<'a>(subs: &'a SubMap, name: &str) -> Option<&'a str> {
    subs.get(name).map(String::as_str)
}

fn sub<'a>(subs: &'a SubMap, eventname: &str, name: &str) -> Result<&'a str, EventParsingError> {
    sub_opt(subs, name).ok_or_else(|| EventParsingError::MissingSubElement {
        eventname: eventname.to_owned(),
        name: name.to_owned(),
    })
}

fn parse_num<T: std::str::FromStr>(
    value: &str,
    eventname: &str,
    name: &str,
) -> Result<T, EventParsingError> {
    value
        .trim()
        .parse()
        .map_err(|_| EventParsingError::InvalidNumber {
            eventname: eventname.to_owned(),
            name: name.to_owned(),
            value: value.to_owned(),
        })
}

fn sub_f64(subs: &SubMap, eventname: &str, name: &str) -> Result<f64, EventParsingError> {
    parse_num(sub(subs, eventname, name)?, eventname, name)
}

fn sub_i64(subs: &SubMap, eventname: &str, name: &str) -> Result<i64, EventParsingError> {
    parse_num(sub(subs, eventname, name)?, eventname, name)
}

fn shape_slide(subs: &SubMap, off_by_one: bool) -> Result<Option<i64>, EventParsingError> {
    match sub_opt(subs, "slide") {
        Some(v) => {
            let s: i64 = parse_num(v, "shape", "slide")?;
            Ok(Some(if off_by_one { s - 1 } else { s }))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(version: &str, metadata: &str, events: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<recording bbb_version=\"{version}\">{metadata}{events}</recording>"
        )
    }

    #[test]
    fn synthesizes_record_event_when_absent() {
        let xml = doc(
            "2.0",
            "<metadata bn-rec-hide-logo=\"false\"></metadata>",
            r#"<event timestamp="1000" module="PRESENTATION" eventname="GotoSlideEvent"><slide>2</slide></event>"#,
        );
        let parsed = parse_events_str(&xml).unwrap();
        assert!(!parsed.hide_logo);
        let first = parsed.events.front().unwrap();
        assert_eq!(first.timestamp, Rational64::from_integer(0));
        assert!(matches!(
            first.kind,
            EventKind::Record(RecordEvent { status: true })
        ));
    }

    #[test]
    fn timestamps_rebase_to_first_event() {
        let xml = doc(
            "2.0",
            "<metadata/>",
            concat!(
                r#"<event timestamp="5000" module="PRESENTATION" eventname="GotoSlideEvent"><slide>1</slide></event>"#,
                r#"<event timestamp="5500" module="PRESENTATION" eventname="GotoSlideEvent"><slide>2</slide></event>"#,
            ),
        );
        let parsed = parse_events_str(&xml).unwrap();
        assert_eq!(parsed.length, Rational64::new(1, 2));
        // Synthetic record + the two slides.
        assert_eq!(parsed.events.len(), 3);
        assert_eq!(parsed.events[2].timestamp, Rational64::new(1, 2));
    }

    #[test]
    fn nan_and_zero_pan_zoom_are_neutralized() {
        let xml = doc(
            "2.0",
            "<metadata/>",
            concat!(
                r#"<event timestamp="0" module="PRESENTATION" eventname="ResizeAndMoveSlideEvent">"#,
                "<xOffset>NaN</xOffset><yOffset>NaN</yOffset>",
                "<widthRatio>0</widthRatio><heightRatio>0</heightRatio>",
                "</event>",
            ),
        );
        let parsed = parse_events_str(&xml).unwrap();
        let pan_zoom = parsed
            .events
            .iter()
            .find_map(|e| match &e.kind {
                EventKind::PanZoom(p) => Some(p.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(pan_zoom.pan, Position::new(0.0, 0.0));
        assert_eq!(pan_zoom.zoom, Size::new(1.0, 1.0));
        assert_eq!(pan_zoom.pod_id, DEFAULT_PRESENTATION_POD);
    }

    #[test]
    fn legacy_pan_is_scaled_by_half_percent_units() {
        let xml = doc(
            "2.0",
            "<metadata/>",
            concat!(
                r#"<event timestamp="0" module="PRESENTATION" eventname="ResizeAndMoveSlideEvent">"#,
                "<xOffset>-25</xOffset><yOffset>-10</yOffset>",
                "<widthRatio>50</widthRatio><heightRatio>50</heightRatio>",
                "</event>",
            ),
        );
        let parsed = parse_events_str(&xml).unwrap();
        let pan_zoom = parsed
            .events
            .iter()
            .find_map(|e| match &e.kind {
                EventKind::PanZoom(p) => Some(p.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(pan_zoom.pan, Position::new(-0.5, -0.2));
        assert_eq!(pan_zoom.zoom, Size::new(0.5, 0.5));
    }

    #[test]
    fn cursor_outside_slide_is_hidden() {
        let xml = doc(
            "2.0",
            "<metadata/>",
            concat!(
                r#"<event timestamp="0" module="PRESENTATION" eventname="CursorMoveEvent">"#,
                "<xOffset>1.5</xOffset><yOffset>0.5</yOffset></event>",
            ),
        );
        let parsed = parse_events_str(&xml).unwrap();
        let cursor = parsed
            .events
            .iter()
            .find_map(|e| match &e.kind {
                EventKind::Cursor(c) => Some(c.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(cursor.cursor, None);
    }

    #[test]
    fn shape_with_thickness_percent_and_flags() {
        let xml = doc(
            "2.0",
            "<metadata/>",
            concat!(
                r#"<event timestamp="0" module="WHITEBOARD" eventname="AddShapeEvent">"#,
                "<id>s1</id><type>rectangle</type><status>DRAW_END</status>",
                "<presentation>pres</presentation><slide>3</slide><userId>u1</userId>",
                "<dataPoints>10,20,30,40</dataPoints>",
                "<color>16711680</color><thickness>5</thickness>",
                "<square>true</square></event>",
            ),
        );
        let parsed = parse_events_str(&xml).unwrap();
        let shape = parsed
            .events
            .iter()
            .find_map(|e| match &e.kind {
                EventKind::Shape(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(shape.kind, LegacyShapeKind::Rectangle);
        // >= 0.9.0 recordings do not shift the slide number.
        assert_eq!(shape.slide, Some(3));
        assert_eq!(shape.thickness_ratio, Some(0.05));
        assert_eq!(shape.thickness, None);
        assert!(shape.square);
        assert!(!shape.rounded);
        assert_eq!(shape.points.len(), 2);
        assert_eq!(shape.points[0], Position::new(0.1, 0.2));
        assert!((shape.color.r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn old_recordings_shift_slide_and_keep_absolute_thickness() {
        let xml = doc(
            "0.81",
            "<metadata/>",
            concat!(
                r#"<event timestamp="0" module="WHITEBOARD" eventname="AddShapeEvent">"#,
                "<type>line</type><slide>3</slide>",
                "<dataPoints>0,0,50,50</dataPoints>",
                "<color>255</color><thickness>4</thickness></event>",
            ),
        );
        let parsed = parse_events_str(&xml).unwrap();
        let shape = parsed
            .events
            .iter()
            .find_map(|e| match &e.kind {
                EventKind::Shape(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(shape.thickness, Some(4.0));
        assert_eq!(shape.thickness_ratio, None);
        assert!(shape.rounded);
    }

    #[test]
    fn shape_without_datapoints_is_dropped() {
        let xml = doc(
            "2.0",
            "<metadata/>",
            concat!(
                r#"<event timestamp="0" module="WHITEBOARD" eventname="AddShapeEvent">"#,
                "<type>pencil</type><status>DRAW_END</status>",
                "<color>0</color><thickness>1</thickness></event>",
                r#"<event timestamp="100" module="PRESENTATION" eventname="GotoSlideEvent"><slide>1</slide></event>"#,
            ),
        );
        let parsed = parse_events_str(&xml).unwrap();
        assert!(parsed
            .events
            .iter()
            .all(|e| !matches!(e.kind, EventKind::Shape(_))));
        // The dropped event still contributes to the recording length.
        assert_eq!(parsed.length, Rational64::new(1, 10));
    }

    #[test]
    fn tldraw_add_shape_carries_raw_json() {
        let xml = doc(
            "2.6.0",
            "<metadata/>",
            concat!(
                r#"<event timestamp="0" module="WHITEBOARD" eventname="AddTldrawShapeEvent">"#,
                "<shapeId>shape:a</shapeId><presentation>pres</presentation>",
                "<pageNumber>1</pageNumber><userId>u1</userId>",
                r#"<shapeData>{"type":"draw","childIndex":1.5}</shapeData></event>"#,
            ),
        );
        let parsed = parse_events_str(&xml).unwrap();
        let add = parsed
            .events
            .iter()
            .find_map(|e| match &e.kind {
                EventKind::TldrawAddShape(a) => Some(a.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(add.id, "shape:a");
        assert_eq!(add.data["type"], "draw");
    }

    #[test]
    fn hide_logo_metadata_is_read() {
        let xml = doc(
            "2.0",
            "<metadata bn-rec-hide-logo=\"true\"/>",
            r#"<event timestamp="0" module="PRESENTATION" eventname="GotoSlideEvent"><slide>0</slide></event>"#,
        );
        assert!(parse_events_str(&xml).unwrap().hide_logo);
    }

    #[test]
    fn empty_document_is_fatal() {
        let xml = doc("2.0", "<metadata/>", "");
        assert!(matches!(
            parse_events_str(&xml),
            Err(EventLogError::NoEvents)
        ));
    }

    #[test]
    fn unknown_whiteboard_event_is_dropped_not_fatal() {
        let xml = doc(
            "2.0",
            "<metadata/>",
            concat!(
                r#"<event timestamp="0" module="WHITEBOARD" eventname="FancyNewEvent"><x>1</x></event>"#,
                r#"<event timestamp="100" module="PRESENTATION" eventname="GotoSlideEvent"><slide>1</slide></event>"#,
            ),
        );
        let parsed = parse_events_str(&xml).unwrap();
        // record synthetic + slide
        assert_eq!(parsed.events.len(), 2);
    }

    #[test]
    fn parse_events_reads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let xml = doc(
            "2.0",
            "<metadata/>",
            r#"<event timestamp="0" module="PRESENTATION" eventname="GotoSlideEvent"><slide>1</slide></event>"#,
        );
        std::fs::write(dir.path().join("events.xml"), xml).unwrap();
        let parsed = parse_events(dir.path()).unwrap();
        assert_eq!(parsed.events.len(), 2);
    }
}
