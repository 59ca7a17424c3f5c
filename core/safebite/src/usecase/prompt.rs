//! モデルへ渡すシステム指示とタスクプロンプト
//!
//! 出力 JSON のキー名は analysis::ModelVerdict の serde 定義と一致させること。

pub const SYSTEM_INSTRUCTION: &str = r#"You are SafeBite AI, a food safety expert.
Your job is to identify the food item, detect likely fraud or adulteration, and explain the health impact.

RULES:
1. Always output valid JSON.
2. Output only the JSON object. No conversational text, markdown or explanations outside it.
3. Never answer "Cannot be determined". When unsure, report the known risks for this food category from your search results.
4. When the sample is Safe, set "shortTermEffects" to "None, safe for consumption." and "longTermRisks" to "None".
5. When the sample is Adulterated or Inconclusive, describe the medical symptoms of the likely contaminants.

JSON STRUCTURE:
{
  "sampleName": "string",
  "status": "Safe" | "Adulterated" | "Inconclusive",
  "confidenceScore": number (0-100),
  "adulterants": [
    {
      "name": "string",
      "type": "string",
      "isToxic": boolean,
      "matchPercentage": number (0-100),
      "description": "string"
    }
  ],
  "shortTermEffects": "string (immediate symptoms)",
  "longTermRisks": "string (chronic impact on organs and systems)",
  "summary": "string"
}
"#;

/// 画像解析のタスクプロンプト（識別 → 調査 → 統合の 3 段階）
pub fn image_prompt(category: &str, notes: Option<&str>) -> String {
    let notes = notes.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("None");
    format!(
        r#"Perform a forensic analysis of this image of a {category} item.
User notes: "{notes}".

STEP 1: IDENTIFY
- Identify the exact food product in the image (for example "Raw Cow Milk", "Chili Powder", "Apple").
- Observe its physical structure, texture, viscosity and color distribution.

STEP 2: RESEARCH (Google Search)
- Search for the common adulterants of this product this year.
- Search for the health effects of consuming an adulterated version of this product.
- Search for the visual signs of a fake version of this product.

STEP 3: SYNTHESIS AND BODY IMPACT
- Compare the visual evidence in the image with the search findings.
- Flag signs such as a chalky texture in milk or an unnaturally bright red in a spice.
- Explain what happens to the human body if the potential adulterants found for this product are consumed.

Output the final result in the required JSON format only."#
    )
}

/// テキスト記述解析のタスクプロンプト
pub fn text_prompt(category: &str, description: &str) -> String {
    format!(
        r#"Analyze this text description of a {category} food item: "{description}".

STEP 1: RESEARCH
- Use Google Search to investigate the symptoms and characteristics described.
- Find common adulterants that match this description.

STEP 2: HEALTH IMPACT
- Summarize what medical research says about consuming these adulterants.
- List the immediate effects (nausea and similar) and the chronic effects (organ damage, cancer and similar).

STEP 3: JSON OUTPUT
- Provide the response in the required JSON format only."#,
        description = description.trim()
    )
}
