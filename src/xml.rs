//! Minimal zero-copy XML lexer
//!
//! Single pass over the input with a three-state machine (content, tag,
//! comment). Element names and attribute name/value pairs are returned as
//! slices into the input, nothing is copied or unescaped. This covers exactly
//! the subset of XML that SVG documents use.
use crate::scan::is_space;

/// Hard cap on attributes delivered per element, excess is dropped.
pub(crate) const MAX_ATTRIBS: usize = 64;

/// One `name="value"` pair inside a start tag
#[derive(Debug, Clone, Copy)]
pub(crate) struct Attribute<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// Receives lexer events while scanning a document
pub(crate) trait XmlHandler {
    fn start_element(&mut self, name: &str, attrs: &[Attribute<'_>]);
    fn end_element(&mut self, name: &str);
    fn content(&mut self, _text: &str) {}
}

enum State {
    Content,
    Tag,
    Comment,
}

/// Tokenize the document, invoking the handler for every element and every
/// non-empty run of content.
pub(crate) fn parse_xml(input: &str, handler: &mut impl XmlHandler) {
    let bytes = input.as_bytes();
    let mut state = State::Content;
    let mut mark = 0;
    let mut index = 0;

    while index < bytes.len() {
        match state {
            State::Content if bytes[index] == b'<' => {
                if mark < index {
                    flush_content(&input[mark..index], handler);
                }
                if bytes[index..].starts_with(b"<!--") {
                    state = State::Comment;
                    index += 4;
                } else {
                    index += 1;
                    mark = index;
                    state = State::Tag;
                }
            }
            State::Tag if bytes[index] == b'>' => {
                parse_element(&input[mark..index], handler);
                index += 1;
                mark = index;
                state = State::Content;
            }
            State::Comment if bytes[index..].starts_with(b"-->") => {
                index += 3;
                mark = index;
                state = State::Content;
            }
            _ => index += 1,
        }
    }
}

fn flush_content(content: &str, handler: &mut impl XmlHandler) {
    let content = content.trim_start_matches(|c: char| c.is_ascii_whitespace());
    if !content.is_empty() {
        handler.content(content);
    }
}

/// Split a single element (everything between `<` and `>`) into its name and
/// attributes, then deliver start/end events.
fn parse_element(element: &str, handler: &mut impl XmlHandler) {
    let mut attrs = [Attribute { name: "", value: "" }; MAX_ATTRIBS];
    let mut nattr = 0;

    let mut rest = element.trim_start_matches(|c: char| c.is_ascii_whitespace());

    // Check if the tag is an end tag
    let mut start = false;
    let mut end = false;
    if let Some(tail) = rest.strip_prefix('/') {
        rest = tail;
        end = true;
    } else {
        start = true;
    }

    // Skip comments, data and preprocessor stuff.
    if rest.is_empty() || rest.starts_with('?') || rest.starts_with('!') {
        return;
    }

    // Get tag name
    let name_end = rest
        .bytes()
        .position(|b| is_space(b) || b == b'/')
        .unwrap_or(rest.len());
    let (name, mut rest) = rest.split_at(name_end);

    // Get attribs
    while !end && nattr < MAX_ATTRIBS - 3 {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
        if rest.is_empty() {
            break;
        }
        if let Some(tail) = rest.strip_prefix('/') {
            rest = tail;
            end = true;
            break;
        }
        // attribute name runs to whitespace or `=`
        let name_end = rest
            .bytes()
            .position(|b| is_space(b) || b == b'=')
            .unwrap_or(rest.len());
        let attr_name = &rest[..name_end];
        rest = &rest[name_end..];
        // skip until the beginning of the value
        let quote_pos = match rest.bytes().position(|b| b == b'"' || b == b'\'') {
            Some(pos) => pos,
            None => break,
        };
        let quote = rest.as_bytes()[quote_pos];
        rest = &rest[quote_pos + 1..];
        // value runs to the matching quote
        let value_end = match rest.bytes().position(|b| b == quote) {
            Some(pos) => pos,
            None => break,
        };
        let attr_value = &rest[..value_end];
        rest = &rest[value_end + 1..];

        // store only well formed attributes
        if !attr_name.is_empty() {
            attrs[nattr] = Attribute {
                name: attr_name,
                value: attr_value,
            };
            nattr += 1;
        }
    }

    if start {
        handler.start_element(name, &attrs[..nattr]);
    }
    if end {
        handler.end_element(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Events {
        log: Vec<String>,
    }

    impl XmlHandler for Events {
        fn start_element(&mut self, name: &str, attrs: &[Attribute<'_>]) {
            let attrs: Vec<_> = attrs
                .iter()
                .map(|a| format!("{}={}", a.name, a.value))
                .collect();
            self.log.push(format!("start {} [{}]", name, attrs.join(",")));
        }

        fn end_element(&mut self, name: &str) {
            self.log.push(format!("end {}", name));
        }

        fn content(&mut self, text: &str) {
            self.log.push(format!("content {}", text));
        }
    }

    #[test]
    fn test_elements() {
        let mut events = Events::default();
        parse_xml("<svg width=\"10\"><g id='a'></g></svg>", &mut events);
        assert_eq!(
            events.log,
            vec![
                "start svg [width=10]",
                "start g [id=a]",
                "end g",
                "end svg",
            ]
        );
    }

    #[test]
    fn test_self_closing() {
        let mut events = Events::default();
        parse_xml("<svg><rect x=\"1\" y=\"2\"/></svg>", &mut events);
        assert_eq!(
            events.log,
            vec![
                "start svg []",
                "start rect [x=1,y=2]",
                "end rect",
                "end svg",
            ]
        );
    }

    #[test]
    fn test_self_closing_without_attributes() {
        let mut events = Events::default();
        parse_xml("<svg><defs/></svg>", &mut events);
        assert_eq!(
            events.log,
            vec!["start svg []", "start defs []", "end defs", "end svg"]
        );
    }

    #[test]
    fn test_comment_and_prolog() {
        let mut events = Events::default();
        parse_xml(
            "<?xml version=\"1.0\"?><!-- <rect/> ignored --><svg>text</svg>",
            &mut events,
        );
        assert_eq!(events.log, vec!["start svg []", "content text", "end svg"]);
    }

    #[test]
    fn test_malformed_attribute_dropped() {
        let mut events = Events::default();
        parse_xml("<rect x=\"1\" bad></rect>", &mut events);
        assert_eq!(events.log, vec!["start rect [x=1]", "end rect"]);
    }
}
