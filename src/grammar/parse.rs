use crate::flags::{FlagValue, Flags};

/// Right-hand side token as written in a grammar file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    Identifier(String),
    String(String),
    Hex(Vec<u8>),
    /// Opaque terminal of a fixed literal length.
    Bytes(usize),
}

pub type ProductionRhs = Vec<Token>;

#[derive(Clone, Debug)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<ProductionRhs>,
}

/// Grammar file before symbols are assigned.
#[derive(Clone, Debug)]
pub struct RawGrammar {
    pub options: Flags,

    /// In order of appearance.
    pub productions: Vec<Production>,
}

peg::parser! {

    pub grammar grammar_parser() for str {

        rule flag() -> (String, FlagValue) =
            key:identifier() _ "=" _ value: flag_value() {
                (key, value)
            }

        rule flag_value() -> FlagValue =
            s:string() {
                s.into()
            }
            /
            n:number() {
                n.into()
            }

        rule flags() -> Flags =
            f:flag()**_ {
                f.into_iter().collect()
            }

        rule hexstring() -> Vec<u8> =
            "0x" hexblock:$(['0'..='9'|'a'..='f'|'A'..='F']+) {?
                if hexblock.len() % 2 != 0 {
                    return Err("number of hex digits should be even for hex block");
                }
                (0..hexblock.len())
                    .step_by(2)
                    .map(|i| u8::from_str_radix(&hexblock[i..i+2], 16))
                    .collect::<Result<Vec<u8>, _>>()
                    .map_err(|_| "malformed hex block")
            }

        rule stringchar() -> char =
            "\\\"" {'"'}
            /
            "\\\\" {'\\'}
            /
            c:[^'"'] {
                c
            }

        rule string() -> String =
            "\"" s:stringchar()+ "\"" {
                s.iter().collect()
            }

        rule identifier() -> String =
            s:$(['a'..='z'|'A'..='Z'|'_']['a'..='z'|'A'..='Z'|'0'..='9'|'_']* ) {
                s.to_string()
            }

        rule number() -> u32 =
            s:$(['0'..='9']+) {?
                s.parse().map_err(|_| "number does not fit in 32 bits")
            }

        rule bytes() -> usize =
            "bytes" _ "(" _ n:number() _ ")" {
                n as usize
            }

        rule token() -> Token =
            "Nothing" !identifier_tail() {
                Token::String("".to_string())
            }/
            n: bytes() {
                Token::Bytes(n)
            }/
            i:identifier() {
                Token::Identifier(i)
            }/
            s: string() {
                Token::String(s)
            }/
            hex: hexstring() {
                Token::Hex(hex)
            }

        rule identifier_tail() =
            ['a'..='z'|'A'..='Z'|'0'..='9'|'_']

        rule rhs() -> ProductionRhs =
             token()++_

        rule more_rhs() -> ProductionRhs =
            _ "|" _ r:rhs() _ {r}

        rule production() -> Production =
            _ name: identifier() _ "->" _ first: rhs() _ rest: more_rhs()* _ ";" _ {
                let mut rest = rest;
                rest.insert(0, first);
                Production { lhs: name, rhs: rest }
            }

        pub rule grammar() -> RawGrammar =
            _ f:flags() _
            prods: production()+ _ {
                RawGrammar { options: f, productions: prods }
            }

        rule comment() = "#" [^'\n']*

        rule _() = quiet!{([' ' | '\r' | '\n' | '\t'] / comment())*}

    }
}
