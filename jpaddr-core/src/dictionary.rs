//! Orthographic variant rule table
//!
//! An ordered list of equivalence rules. Rendering a literal name scans it
//! left to right; at each position the first rule (in table order) with an
//! alternative that occurs there wins, and the matched text is replaced by
//! an alternation of every spelling in that rule. Text no rule covers is
//! escaped verbatim.
//!
//! Order of the table:
//! 1. Named multi-character aliases (renamed towns, kana spellings)
//! 2. Single-character equivalence classes
//! 3. Dash-like glyphs
//! 4. Pre-1946 kanji forms paired with their modern forms

use once_cell::sync::Lazy;

/// Every glyph accepted as a hyphen in an address
pub const DASH_GLYPHS: &str = "-－﹣−‐⁃‑‒–—﹘―⎯⏤ーｰ─━";

const NAMED_ALIASES: &[&[&str]] = &[
    &["三栄町", "四谷三栄町"],
    &["鬮野川", "くじ野川", "くじの川"],
    &["柿碕町", "柿さき町"],
    &["通り", "とおり"],
    &["埠頭", "ふ頭"],
    &["番町", "番丁"],
    &["大冝", "大宜"],
    &["穝", "さい"],
    &["杁", "えぶり"],
    &["薭", "稗", "ひえ", "ヒエ"],
];

const CHARACTER_CLASSES: &[&[&str]] = &[
    &["之", "ノ", "の"],
    &["ヶ", "ケ", "が"],
    &["ヵ", "カ", "か", "力"],
    &["ッ", "ツ", "っ", "つ"],
    &["ニ", "二"],
    &["ハ", "八"],
    &["塚", "塚"],
    &["釜", "竈"],
    &["條", "条"],
    &["狛", "拍"],
    &["藪", "薮"],
    &["渕", "淵"],
    &["エ", "ヱ", "え"],
    &["曾", "曽"],
    &["舟", "船"],
    &["莵", "菟"],
    &["市", "巿"],
];

/// Old (JIS 1946 reform) kanji, position-aligned with [`JIS_NEW_KANJI`]
const JIS_OLD_KANJI: &str = "亞圍壹榮驛應櫻假會懷覺樂陷歡氣戲據挾區徑溪輕藝儉圈權嚴恆國齋雜蠶殘兒實釋從縱敍燒條剩壤釀眞盡醉髓聲竊淺錢禪爭插騷屬對滯擇單斷癡鑄敕鐵傳黨鬪屆腦廢發蠻拂邊瓣寶沒滿藥餘樣亂兩禮靈爐灣惡醫飮營圓歐奧價繪擴學罐勸觀歸犧擧狹驅莖經繼缺劍檢顯廣鑛碎劑參慘絲辭舍壽澁肅將證乘疊孃觸寢圖穗樞齊攝戰潛雙莊裝藏續體臺澤膽彈蟲廳鎭點燈盜獨貳霸賣髮祕佛變辯豐飜默與譽謠覽獵勵齡勞壓爲隱衞鹽毆穩畫壞殼嶽卷關顏僞舊峽曉勳惠螢鷄縣險獻驗效號濟册棧贊齒濕寫收獸處稱奬淨繩讓囑愼粹隨數靜專踐纖壯搜總臟墮帶瀧擔團遲晝聽遞轉當稻讀惱拜麥拔濱竝辨舖襃萬譯豫搖來龍壘隸戀樓鰺鶯蠣攪竃灌諫頸礦蘂靱賤壺礪檮濤邇蠅檜儘藪籠彌麩";

/// Modern kanji, position-aligned with [`JIS_OLD_KANJI`]
const JIS_NEW_KANJI: &str = "亜囲壱栄駅応桜仮会懐覚楽陥歓気戯拠挟区径渓軽芸倹圏権厳恒国斎雑蚕残児実釈従縦叙焼条剰壌醸真尽酔髄声窃浅銭禅争挿騒属対滞択単断痴鋳勅鉄伝党闘届脳廃発蛮払辺弁宝没満薬余様乱両礼霊炉湾悪医飲営円欧奥価絵拡学缶勧観帰犠挙狭駆茎経継欠剣検顕広鉱砕剤参惨糸辞舎寿渋粛将証乗畳嬢触寝図穂枢斉摂戦潜双荘装蔵続体台沢胆弾虫庁鎮点灯盗独弐覇売髪秘仏変弁豊翻黙与誉謡覧猟励齢労圧為隠衛塩殴穏画壊殻岳巻関顔偽旧峡暁勲恵蛍鶏県険献験効号済冊桟賛歯湿写収獣処称奨浄縄譲嘱慎粋随数静専践繊壮捜総臓堕帯滝担団遅昼聴逓転当稲読悩拝麦抜浜並弁舗褒万訳予揺来竜塁隷恋楼鯵鴬蛎撹竈潅諌頚砿蕊靭賎壷砺梼涛迩蝿桧侭薮篭弥麸";

/// One set of interchangeable spellings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRule {
    /// Longest alternative first
    alternatives: Vec<String>,
}

impl VariantRule {
    fn new<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut alternatives: Vec<String> = alternatives.into_iter().map(Into::into).collect();
        alternatives.dedup();
        // Stable: equal lengths keep their table order
        alternatives.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        Self { alternatives }
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    /// Byte length of the alternative occurring at the start of `text`
    pub fn match_len(&self, text: &str) -> Option<usize> {
        self.alternatives
            .iter()
            .find(|alt| text.starts_with(alt.as_str()))
            .map(|alt| alt.len())
    }

    /// Regex group accepting any alternative
    pub fn render(&self) -> String {
        let escaped: Vec<String> = self.alternatives.iter().map(|a| regex::escape(a)).collect();
        format!("(?:{})", escaped.join("|"))
    }
}

static VARIANT_RULES: Lazy<Vec<VariantRule>> = Lazy::new(build_rules);

static DASH_CLASS: Lazy<String> = Lazy::new(|| {
    let glyphs: String = DASH_GLYPHS
        .chars()
        .map(|c| regex::escape(c.encode_utf8(&mut [0u8; 4])))
        .collect();
    format!("[{}]", glyphs)
});

/// Regex character class matching any one dash glyph
pub fn dash_class() -> &'static str {
    &DASH_CLASS
}

fn build_rules() -> Vec<VariantRule> {
    let mut rules: Vec<VariantRule> = NAMED_ALIASES
        .iter()
        .chain(CHARACTER_CLASSES.iter())
        .map(|alts| VariantRule::new(alts.iter().copied()))
        .collect();

    rules.push(VariantRule::new(DASH_GLYPHS.chars().map(String::from)));

    // Several old forms can share one modern form (瓣/辯/辨 → 弁)
    let mut by_modern: Vec<(char, Vec<char>)> = Vec::new();
    for (old, new) in JIS_OLD_KANJI.chars().zip(JIS_NEW_KANJI.chars()) {
        match by_modern.iter_mut().find(|(modern, _)| *modern == new) {
            Some((_, olds)) => olds.push(old),
            None => by_modern.push((new, vec![old])),
        }
    }
    for (modern, olds) in by_modern {
        let alternatives = olds
            .into_iter()
            .chain(std::iter::once(modern))
            .map(String::from);
        rules.push(VariantRule::new(alternatives));
    }

    rules
}

/// The rule table in evaluation order
pub fn variant_rules() -> &'static [VariantRule] {
    &VARIANT_RULES
}

/// Regex fragment matching `name` and its orthographic variants
///
/// The fragment is unanchored; anchoring is up to the caller.
pub fn literal_pattern(name: &str) -> String {
    let rules = variant_rules();
    let mut pattern = String::with_capacity(name.len() * 4);
    let mut pos = 0;

    while pos < name.len() {
        let rest = &name[pos..];
        let hit = rules
            .iter()
            .find_map(|rule| rule.match_len(rest).map(|len| (rule, len)));

        match hit {
            Some((rule, len)) => {
                pattern.push_str(&rule.render());
                pos += len;
            }
            None => {
                // rest is non-empty, so there is a next char
                let c = rest.chars().next().unwrap_or_default();
                pattern.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4])));
                pos += c.len_utf8();
            }
        }
    }

    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn full_match(name: &str, candidate: &str) -> bool {
        Regex::new(&format!("^{}$", literal_pattern(name)))
            .unwrap()
            .is_match(candidate)
    }

    #[test]
    fn test_jis_tables_are_aligned() {
        assert_eq!(JIS_OLD_KANJI.chars().count(), JIS_NEW_KANJI.chars().count());
    }

    #[test]
    fn test_rule_alternatives_longest_first() {
        for rule in variant_rules() {
            let lengths: Vec<usize> = rule.alternatives().iter().map(|a| a.chars().count()).collect();
            let mut sorted = lengths.clone();
            sorted.sort_by(|a, b| b.cmp(a));
            assert_eq!(lengths, sorted, "rule {:?}", rule);
        }
    }

    #[test]
    fn test_plain_name_matches_only_itself() {
        assert!(full_match("堺市北区", "堺市北区"));
        assert!(!full_match("堺市北区", "堺市南区"));
    }

    #[test]
    fn test_regex_metacharacters_are_escaped() {
        assert!(full_match("A.B(C)", "A.B(C)"));
        assert!(!full_match("A.B(C)", "AxB(C)"));
    }

    #[test]
    fn test_named_alias() {
        assert!(full_match("鬮野川", "くじ野川"));
        assert!(full_match("鬮野川", "くじの川"));
        assert!(full_match("くじ野川", "鬮野川"));
        assert!(full_match("四谷三栄町", "三栄町"));
    }

    #[test]
    fn test_longer_alias_takes_precedence() {
        // 四谷三栄町 must be consumed whole, not as 四谷 + (三栄町)
        let pattern = literal_pattern("四谷三栄町");
        assert_eq!(pattern, variant_rules()[0].render());
    }

    #[test]
    fn test_character_classes() {
        assert!(full_match("竜ヶ崎", "竜ケ崎"));
        assert!(full_match("竜ヶ崎", "竜が崎"));
        assert!(full_match("霞ノ浦", "霞之浦"));
        assert!(full_match("市川", "巿川"));
    }

    #[test]
    fn test_old_kanji_forms() {
        assert!(full_match("桜木町", "櫻木町"));
        assert!(full_match("櫻木町", "桜木町"));
        assert!(full_match("竜田", "龍田"));
    }

    #[test]
    fn test_shared_modern_form_accepts_every_old_form() {
        for old in ["瓣", "辯", "辨"] {
            assert!(full_match("弁天町", &format!("{}天町", old)));
        }
    }

    #[test]
    fn test_dash_class_matches_every_glyph() {
        let class = Regex::new(&format!("^{}$", dash_class())).unwrap();
        for glyph in DASH_GLYPHS.chars() {
            assert!(class.is_match(&glyph.to_string()), "glyph {:?}", glyph);
        }
        assert!(!class.is_match("a"));
    }

    #[test]
    fn test_dash_glyphs_are_interchangeable() {
        assert!(full_match("センター", "センタ-"));
        assert!(full_match("センター", "センタ－"));
        assert!(full_match("センター", "センタ━"));
    }
}
